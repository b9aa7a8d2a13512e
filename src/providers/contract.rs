//! Provider contract checks.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Checks an amount returned by a provider.
///
/// `Decimal` cannot hold NaN or infinity, so the remaining way a provider
/// can break its contract on a single value is a negative amount.
///
/// # Examples
///
/// ```
/// use payslip_engine::providers::check_amount;
/// use rust_decimal::Decimal;
///
/// assert!(check_amount("tax", Decimal::new(12050, 2)).is_ok());
/// assert!(check_amount("tax", Decimal::new(-1, 0)).is_err());
/// ```
pub fn check_amount(provider: &str, amount: Decimal) -> EngineResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(EngineError::ProviderContractViolation {
            provider: provider.to_string(),
            message: format!("returned negative amount {}", amount),
        });
    }
    Ok(amount)
}

/// Unwraps the result of checked arithmetic inside a provider, failing
/// with [`EngineError::ProviderFailure`] when it overflowed.
pub(crate) fn within_range(provider: &str, value: Option<Decimal>) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::ProviderFailure {
        provider: provider.to_string(),
        message: "amount overflows decimal range".to_string(),
    })
}
