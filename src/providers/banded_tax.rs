//! Banded income tax provider.
//!
//! Computes per-period income tax from the bands of a tax year, using the
//! personal allowance encoded in the employee's tax code.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::TaxYearConfig;
use crate::error::{EngineError, EngineResult};

use super::TaxProvider;
use super::contract::within_range;

/// Share of period earnings that K-code tax may not exceed.
const K_CODE_CAP: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// The tax treatment a tax code describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxCode {
    /// Annual tax-free allowance, negative for K codes.
    Allowance(Decimal),
    /// All earnings taxed at the rate of the band with this index.
    FlatRate(usize),
    /// No tax is due.
    NoTax,
}

impl TaxCode {
    /// Returns true for K codes, whose allowance is negative.
    pub fn is_k_code(&self) -> bool {
        matches!(self, TaxCode::Allowance(allowance) if *allowance < Decimal::ZERO)
    }
}

impl FromStr for TaxCode {
    type Err = EngineError;

    /// Parses a tax code such as `1257L`, `K475`, `BR`, `D0`, `D1`, `0T`
    /// or `NT`. A leading `S` or `C` country prefix is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use payslip_engine::providers::TaxCode;
    /// use rust_decimal::Decimal;
    ///
    /// let code: TaxCode = "1257L".parse().unwrap();
    /// assert_eq!(code, TaxCode::Allowance(Decimal::new(12570, 0)));
    /// assert_eq!("BR".parse::<TaxCode>().unwrap(), TaxCode::FlatRate(0));
    /// assert!("??".parse::<TaxCode>().is_err());
    /// ```
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let normalized = code.trim().to_ascii_uppercase();
        let body = normalized
            .strip_prefix('S')
            .or_else(|| normalized.strip_prefix('C'))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&normalized);

        let unknown = || EngineError::not_found("tax code", code);

        match body {
            "NT" => return Ok(TaxCode::NoTax),
            "BR" => return Ok(TaxCode::FlatRate(0)),
            "D0" => return Ok(TaxCode::FlatRate(1)),
            "D1" => return Ok(TaxCode::FlatRate(2)),
            _ => {}
        }

        if let Some(digits) = body.strip_prefix('K') {
            let allowance = parse_allowance_digits(digits).ok_or_else(unknown)?;
            return Ok(TaxCode::Allowance(-allowance));
        }

        let digits = body
            .strip_suffix(['L', 'M', 'N', 'T'])
            .ok_or_else(unknown)?;
        let allowance = parse_allowance_digits(digits).ok_or_else(unknown)?;
        Ok(TaxCode::Allowance(allowance))
    }
}

/// Tax codes carry the annual allowance divided by ten.
fn parse_allowance_digits(digits: &str) -> Option<Decimal> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits
        .parse::<u32>()
        .ok()
        .map(|tenths| Decimal::from(tenths) * Decimal::TEN)
}

/// Income tax provider backed by per-year band tables.
#[derive(Debug, Clone)]
pub struct BandedTaxProvider {
    tax_years: BTreeMap<String, TaxYearConfig>,
}

impl BandedTaxProvider {
    /// Creates a provider over the given tax years.
    pub fn new(tax_years: impl IntoIterator<Item = TaxYearConfig>) -> Self {
        Self {
            tax_years: tax_years
                .into_iter()
                .map(|year| (year.id.clone(), year))
                .collect(),
        }
    }

    /// Computes tax synchronously.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown tax year or tax code, or for a
    /// flat-rate code that names a band the year does not have.
    pub fn calculate(
        &self,
        total_earnings: Decimal,
        tax_code: &str,
        tax_year_id: &str,
    ) -> EngineResult<Decimal> {
        let year = self
            .tax_years
            .get(tax_year_id)
            .ok_or_else(|| EngineError::not_found("tax year", tax_year_id))?;
        let code: TaxCode = tax_code.parse()?;

        if total_earnings <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let tax = match code {
            TaxCode::NoTax => Decimal::ZERO,
            TaxCode::FlatRate(index) => {
                let band = year
                    .income_tax
                    .bands
                    .get(index)
                    .ok_or_else(|| EngineError::not_found("tax band for code", tax_code))?;
                within_range("tax", total_earnings.checked_mul(band.rate))?
            }
            TaxCode::Allowance(annual_allowance) => {
                let taxable = within_range(
                    "tax",
                    total_earnings.checked_sub(year.per_period(annual_allowance)),
                )?;
                let tax = banded_tax(year, taxable)?;
                if code.is_k_code() {
                    tax.min(total_earnings * K_CODE_CAP)
                } else {
                    tax
                }
            }
        };

        Ok(tax)
    }
}

/// Applies the year's bands to per-period taxable income.
fn banded_tax(year: &TaxYearConfig, taxable: Decimal) -> EngineResult<Decimal> {
    if taxable <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for band in &year.income_tax.bands {
        let upper = band.upper_limit.map(|limit| year.per_period(limit));
        let top = upper.map_or(taxable, |u| taxable.min(u));
        if top > lower {
            let band_tax = (top - lower).checked_mul(band.rate);
            tax = within_range("tax", band_tax.and_then(|t| tax.checked_add(t)))?;
        }
        match upper {
            Some(u) if taxable > u => lower = u,
            _ => break,
        }
    }
    Ok(tax)
}

impl TaxProvider for BandedTaxProvider {
    async fn tax_amount(
        &self,
        total_earnings: Decimal,
        tax_code: &str,
        tax_year_id: &str,
    ) -> EngineResult<Decimal> {
        self.calculate(total_earnings, tax_code, tax_year_id)
    }
}
