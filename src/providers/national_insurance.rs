//! Threshold-based national insurance provider.

use rust_decimal::Decimal;

use crate::config::TaxYearConfig;
use crate::error::EngineResult;

use super::InsuranceProvider;
use super::contract::within_range;

/// National insurance provider for one tax year.
///
/// Thresholds are converted to per-period amounts when the provider is
/// built. No contribution is due at or below the primary threshold; the
/// main rate applies up to the upper earnings limit and the upper rate
/// above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdInsuranceProvider {
    primary_threshold: Decimal,
    upper_earnings_limit: Decimal,
    main_rate: Decimal,
    upper_rate: Decimal,
}

impl ThresholdInsuranceProvider {
    /// Builds the provider from a tax year's tables.
    pub fn for_tax_year(year: &TaxYearConfig) -> Self {
        let tables = &year.national_insurance;
        Self {
            primary_threshold: year.per_period(tables.primary_threshold),
            upper_earnings_limit: year.per_period(tables.upper_earnings_limit),
            main_rate: tables.main_rate,
            upper_rate: tables.upper_rate,
        }
    }

    /// Computes the contribution synchronously.
    ///
    /// # Errors
    ///
    /// Returns `ProviderFailure` if the contribution overflows.
    pub fn calculate(&self, total_earnings: Decimal) -> EngineResult<Decimal> {
        if total_earnings <= self.primary_threshold {
            return Ok(Decimal::ZERO);
        }

        let main_band = total_earnings.min(self.upper_earnings_limit) - self.primary_threshold;
        let upper_band = if total_earnings > self.upper_earnings_limit {
            total_earnings - self.upper_earnings_limit
        } else {
            Decimal::ZERO
        };

        let main = main_band.checked_mul(self.main_rate);
        let upper = upper_band.checked_mul(self.upper_rate);
        within_range(
            "insurance",
            main.zip(upper).and_then(|(main, upper)| main.checked_add(upper)),
        )
    }
}

impl InsuranceProvider for ThresholdInsuranceProvider {
    async fn ni_contribution(&self, total_earnings: Decimal) -> EngineResult<Decimal> {
        self.calculate(total_earnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IncomeTaxTables, NationalInsuranceTables, TaxBand};
    use crate::error::EngineError;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn provider() -> ThresholdInsuranceProvider {
        let year = TaxYearConfig {
            id: "2025-26".to_string(),
            label: "2025/2026".to_string(),
            periods_per_year: 12,
            income_tax: IncomeTaxTables {
                bands: vec![TaxBand {
                    name: "basic".to_string(),
                    rate: dec("0.20"),
                    upper_limit: None,
                }],
            },
            national_insurance: NationalInsuranceTables {
                primary_threshold: dec("12570"),
                upper_earnings_limit: dec("50270"),
                main_rate: dec("0.08"),
                upper_rate: dec("0.02"),
            },
            student_loans: HashMap::new(),
        };
        ThresholdInsuranceProvider::for_tax_year(&year)
    }

    #[test]
    fn test_thresholds_are_per_period() {
        let provider = provider();
        assert_eq!(provider.primary_threshold, dec("1047.5"));
        assert_eq!(
            provider.upper_earnings_limit.round_dp(2),
            dec("4189.17")
        );
    }

    #[test]
    fn test_zero_below_threshold() {
        assert_eq!(provider().calculate(dec("950")).unwrap(), Decimal::ZERO);
        assert_eq!(provider().calculate(dec("1047.50")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_main_rate_between_thresholds() {
        // (3000 - 1047.50) x 8%
        assert_eq!(provider().calculate(dec("3000")).unwrap(), dec("156.20"));
    }

    #[test]
    fn test_upper_rate_above_limit() {
        // (4189.17 - 1047.50) x 8% + (5000 - 4189.17) x 2%
        assert_eq!(provider().calculate(dec("5000")).unwrap().round_dp(2), dec("267.55"));
    }

    #[test]
    fn test_contribution_is_monotonic() {
        let provider = provider();
        let mut previous = Decimal::ZERO;
        for pounds in (0..10_000).step_by(100) {
            let current = provider.calculate(Decimal::from(pounds)).unwrap();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_upper_rate_overflow_is_provider_failure() {
        let mut provider = provider();
        provider.upper_rate = dec("2");
        match provider.calculate(Decimal::MAX).unwrap_err() {
            EngineError::ProviderFailure { provider, .. } => assert_eq!(provider, "insurance"),
            other => panic!("Expected ProviderFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_trait_delegates_to_calculate() {
        let amount = provider().ni_contribution(dec("3000")).await.unwrap();
        assert_eq!(amount, dec("156.20"));
    }
}
