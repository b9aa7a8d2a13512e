//! Input guards shared by the pure calculation stages.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Fails with [`EngineError::InvalidInput`] if `value` is negative.
pub(crate) fn require_non_negative(field: &str, value: Decimal) -> EngineResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(value)
}

/// Unwraps the result of checked `Decimal` arithmetic, failing with
/// [`EngineError::InvalidInput`] when it overflowed.
pub(crate) fn in_range(field: &str, value: Option<Decimal>) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::invalid_input(field, "amount overflows decimal range"))
}
