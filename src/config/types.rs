//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeRecord, LoanPlan};

/// Default factor applied to the hourly rate for overtime hours.
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Default number of decimal places money is rounded to.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Metadata about the payroll configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollMetadata {
    /// The human-readable name of the configuration.
    pub name: String,
    /// The jurisdiction whose rules the tables describe.
    pub jurisdiction: String,
    /// The version of the configuration.
    pub version: String,
}

/// How monetary amounts are rounded to the configured precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero (2.345 -> 2.35).
    #[default]
    MidpointAwayFromZero,
    /// Round half to even, also known as banker's rounding (2.345 -> 2.34).
    MidpointNearestEven,
    /// Truncate towards zero.
    ToZero,
    /// Round any remainder away from zero.
    AwayFromZero,
}

impl RoundingMode {
    /// Returns the equivalent `rust_decimal` strategy.
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingMode::MidpointAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::MidpointNearestEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::ToZero => RoundingStrategy::ToZero,
            RoundingMode::AwayFromZero => RoundingStrategy::AwayFromZero,
        }
    }
}

/// Currency rounding policy.
///
/// # Example
///
/// ```
/// use payslip_engine::config::{RoundingConfig, RoundingMode};
/// use rust_decimal::Decimal;
///
/// let rounding = RoundingConfig { decimal_places: 2, mode: RoundingMode::MidpointNearestEven };
/// assert_eq!(rounding.apply(Decimal::new(2345, 3)), Decimal::new(234, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RoundingConfig {
    /// Number of decimal places money is kept to.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// The rounding strategy.
    #[serde(default)]
    pub mode: RoundingMode,
}

fn default_decimal_places() -> u32 {
    DEFAULT_DECIMAL_PLACES
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            mode: RoundingMode::default(),
        }
    }
}

impl RoundingConfig {
    /// Rounds an amount to the configured precision.
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places, self.mode.strategy())
    }
}

/// Rate rule configuration: overtime multiplier and currency rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateRulesConfig {
    /// Factor applied to the hourly rate for overtime hours.
    #[serde(default = "default_overtime_multiplier")]
    pub overtime_multiplier: Decimal,
    /// Currency rounding policy.
    #[serde(default)]
    pub rounding: RoundingConfig,
}

fn default_overtime_multiplier() -> Decimal {
    DEFAULT_OVERTIME_MULTIPLIER
}

impl Default for RateRulesConfig {
    fn default() -> Self {
        Self {
            overtime_multiplier: DEFAULT_OVERTIME_MULTIPLIER,
            rounding: RoundingConfig::default(),
        }
    }
}

impl RateRulesConfig {
    /// Checks the configuration is usable.
    pub fn validate(&self) -> EngineResult<()> {
        if self.overtime_multiplier <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "overtime_multiplier",
                format!("must be greater than zero, got {}", self.overtime_multiplier),
            ));
        }
        if self.rounding.decimal_places > 28 {
            return Err(EngineError::invalid_input(
                "rounding.decimal_places",
                format!("must be at most 28, got {}", self.rounding.decimal_places),
            ));
        }
        Ok(())
    }
}

/// payroll.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollFile {
    /// Configuration metadata.
    pub metadata: PayrollMetadata,
    /// Rate rules.
    #[serde(default)]
    pub rate_rules: RateRulesConfig,
}

/// An income tax band.
///
/// Bands are listed lowest first. `upper_limit` is an annual amount of
/// taxable income (income above the personal allowance); the last band has
/// no upper limit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBand {
    /// The name of the band (e.g., "basic").
    pub name: String,
    /// The marginal rate as a fraction (e.g., 0.20).
    pub rate: Decimal,
    /// Annual taxable income at which the band ends.
    #[serde(default)]
    pub upper_limit: Option<Decimal>,
}

/// Income tax tables for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncomeTaxTables {
    /// Tax bands, lowest first.
    pub bands: Vec<TaxBand>,
}

/// National insurance thresholds and rates for one tax year.
///
/// Thresholds are annual amounts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NationalInsuranceTables {
    /// Earnings at or below which no contribution is due.
    pub primary_threshold: Decimal,
    /// Earnings above which the upper rate applies.
    pub upper_earnings_limit: Decimal,
    /// Rate between the primary threshold and the upper earnings limit.
    pub main_rate: Decimal,
    /// Rate above the upper earnings limit.
    pub upper_rate: Decimal,
}

/// Repayment terms for one student loan plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StudentLoanTerms {
    /// Annual earnings threshold above which repayments are due.
    pub annual_threshold: Decimal,
    /// Repayment rate on earnings above the threshold.
    pub rate: Decimal,
}

/// All tables for a single tax year (one file under `tax_years/`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxYearConfig {
    /// The reference key of the tax year (e.g., "2025-26").
    pub id: String,
    /// Human-readable label (e.g., "2025/2026").
    pub label: String,
    /// Number of pay periods in the year (12 for monthly pay).
    pub periods_per_year: u32,
    /// Income tax tables.
    pub income_tax: IncomeTaxTables,
    /// National insurance tables.
    pub national_insurance: NationalInsuranceTables,
    /// Student loan repayment terms by plan.
    #[serde(default)]
    pub student_loans: HashMap<LoanPlan, StudentLoanTerms>,
}

impl TaxYearConfig {
    /// Converts an annual amount to a per-period amount.
    pub fn per_period(&self, annual: Decimal) -> Decimal {
        annual / Decimal::from(self.periods_per_year)
    }

    /// Checks the tables are internally consistent.
    pub fn validate(&self) -> EngineResult<()> {
        if self.periods_per_year == 0 {
            return Err(EngineError::invalid_input(
                "periods_per_year",
                format!("tax year '{}' must have at least one pay period", self.id),
            ));
        }
        if self.income_tax.bands.is_empty() {
            return Err(EngineError::invalid_input(
                "income_tax.bands",
                format!("tax year '{}' has no tax bands", self.id),
            ));
        }
        let mut previous = Decimal::ZERO;
        let last = self.income_tax.bands.len() - 1;
        for (index, band) in self.income_tax.bands.iter().enumerate() {
            if band.rate < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    "income_tax.bands",
                    format!("band '{}' has a negative rate", band.name),
                ));
            }
            match band.upper_limit {
                Some(limit) if limit <= previous => {
                    return Err(EngineError::invalid_input(
                        "income_tax.bands",
                        format!("band '{}' upper limits must increase", band.name),
                    ));
                }
                Some(limit) => previous = limit,
                None if index != last => {
                    return Err(EngineError::invalid_input(
                        "income_tax.bands",
                        format!("only the last band may be open-ended, not '{}'", band.name),
                    ));
                }
                None => {}
            }
        }
        let ni = &self.national_insurance;
        if ni.upper_earnings_limit < ni.primary_threshold {
            return Err(EngineError::invalid_input(
                "national_insurance",
                "upper earnings limit is below the primary threshold",
            ));
        }
        if ni.main_rate < Decimal::ZERO || ni.upper_rate < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "national_insurance",
                "rates must not be negative",
            ));
        }
        Ok(())
    }
}

/// employees.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeesConfig {
    /// Flat union fee charged each period to union members.
    pub union_fee: Decimal,
    /// Employees known to the payroll.
    pub employees: Vec<EmployeeRecord>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    metadata: PayrollMetadata,
    rate_rules: RateRulesConfig,
    tax_years: BTreeMap<String, TaxYearConfig>,
    employees: EmployeesConfig,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        metadata: PayrollMetadata,
        rate_rules: RateRulesConfig,
        tax_years: Vec<TaxYearConfig>,
        employees: EmployeesConfig,
    ) -> Self {
        let tax_years = tax_years
            .into_iter()
            .map(|year| (year.id.clone(), year))
            .collect();
        Self {
            metadata,
            rate_rules,
            tax_years,
            employees,
        }
    }

    /// Returns the configuration metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        &self.metadata
    }

    /// Returns the rate rules.
    pub fn rate_rules(&self) -> &RateRulesConfig {
        &self.rate_rules
    }

    /// Returns all tax years keyed by id.
    pub fn tax_years(&self) -> &BTreeMap<String, TaxYearConfig> {
        &self.tax_years
    }

    /// Returns the employee configuration.
    pub fn employees(&self) -> &EmployeesConfig {
        &self.employees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_tax_year() -> TaxYearConfig {
        TaxYearConfig {
            id: "2025-26".to_string(),
            label: "2025/2026".to_string(),
            periods_per_year: 12,
            income_tax: IncomeTaxTables {
                bands: vec![
                    TaxBand {
                        name: "basic".to_string(),
                        rate: dec("0.20"),
                        upper_limit: Some(dec("37700")),
                    },
                    TaxBand {
                        name: "higher".to_string(),
                        rate: dec("0.40"),
                        upper_limit: None,
                    },
                ],
            },
            national_insurance: NationalInsuranceTables {
                primary_threshold: dec("12570"),
                upper_earnings_limit: dec("50270"),
                main_rate: dec("0.08"),
                upper_rate: dec("0.02"),
            },
            student_loans: HashMap::new(),
        }
    }

    #[test]
    fn test_default_rate_rules() {
        let rules = RateRulesConfig::default();
        assert_eq!(rules.overtime_multiplier, dec("1.5"));
        assert_eq!(rules.rounding.decimal_places, 2);
        assert_eq!(rules.rounding.mode, RoundingMode::MidpointAwayFromZero);
    }

    #[test]
    fn test_rate_rules_defaults_when_fields_missing() {
        let rules: RateRulesConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(rules, RateRulesConfig::default());
    }

    #[test]
    fn test_rate_rules_deserialize() {
        let yaml = r#"
overtime_multiplier: "2.0"
rounding:
  decimal_places: 3
  mode: to_zero
"#;
        let rules: RateRulesConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.overtime_multiplier, dec("2.0"));
        assert_eq!(rules.rounding.decimal_places, 3);
        assert_eq!(rules.rounding.mode, RoundingMode::ToZero);
    }

    #[test]
    fn test_non_positive_multiplier_is_invalid() {
        let rules = RateRulesConfig {
            overtime_multiplier: Decimal::ZERO,
            ..RateRulesConfig::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rounding_modes() {
        let amount = dec("2.345");
        let round = |mode| RoundingConfig {
            decimal_places: 2,
            mode,
        }
        .apply(amount);

        assert_eq!(round(RoundingMode::MidpointAwayFromZero), dec("2.35"));
        assert_eq!(round(RoundingMode::MidpointNearestEven), dec("2.34"));
        assert_eq!(round(RoundingMode::ToZero), dec("2.34"));
        assert_eq!(round(RoundingMode::AwayFromZero), dec("2.35"));
    }

    #[test]
    fn test_per_period_divides_by_periods() {
        let year = create_tax_year();
        assert_eq!(year.per_period(dec("12570")), dec("1047.5"));
    }

    #[test]
    fn test_valid_tax_year() {
        assert!(create_tax_year().validate().is_ok());
    }

    #[test]
    fn test_open_ended_band_must_be_last() {
        let mut year = create_tax_year();
        year.income_tax.bands[0].upper_limit = None;
        assert!(year.validate().is_err());
    }

    #[test]
    fn test_band_limits_must_increase() {
        let mut year = create_tax_year();
        year.income_tax.bands[1].upper_limit = Some(dec("1000"));
        assert!(year.validate().is_err());
    }

    #[test]
    fn test_zero_periods_is_invalid() {
        let mut year = create_tax_year();
        year.periods_per_year = 0;
        assert!(year.validate().is_err());
    }

    #[test]
    fn test_config_indexes_tax_years_by_id() {
        let config = PayrollConfig::new(
            PayrollMetadata {
                name: "Test".to_string(),
                jurisdiction: "UK".to_string(),
                version: "1".to_string(),
            },
            RateRulesConfig::default(),
            vec![create_tax_year()],
            EmployeesConfig {
                union_fee: dec("10"),
                employees: vec![],
            },
        );
        assert!(config.tax_years().contains_key("2025-26"));
        assert_eq!(config.metadata().jurisdiction, "UK");
    }
}
