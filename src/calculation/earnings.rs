//! Total earnings aggregation.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::AuditStep;

use super::guard::{in_range, require_non_negative};

/// The result of aggregating contractual and overtime earnings.
#[derive(Debug, Clone)]
pub struct EarningsResult {
    /// Contractual plus overtime earnings.
    pub total_earnings: Decimal,
    /// The audit step recording the aggregation.
    pub audit_step: AuditStep,
}

/// Sums overtime and contractual earnings.
///
/// # Errors
///
/// Returns `InvalidInput` if either component is negative or the sum
/// overflows.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_total_earnings;
/// use rust_decimal::Decimal;
///
/// let result = calculate_total_earnings(Decimal::new(150, 0), Decimal::new(800, 0), 5).unwrap();
/// assert_eq!(result.total_earnings, Decimal::new(950, 0));
/// assert_eq!(result.audit_step.step_number, 5);
/// ```
pub fn calculate_total_earnings(
    overtime_earnings: Decimal,
    contractual_earnings: Decimal,
    step_number: u32,
) -> EngineResult<EarningsResult> {
    require_non_negative("overtime_earnings", overtime_earnings)?;
    require_non_negative("contractual_earnings", contractual_earnings)?;

    let total_earnings = in_range(
        "total_earnings",
        contractual_earnings.checked_add(overtime_earnings),
    )?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "total_earnings".to_string(),
        rule_name: "Total Earnings".to_string(),
        input: serde_json::json!({
            "contractual_earnings": contractual_earnings.normalize().to_string(),
            "overtime_earnings": overtime_earnings.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_earnings": total_earnings.normalize().to_string()
        }),
        reasoning: format!(
            "${} contractual + ${} overtime = ${}",
            contractual_earnings.normalize(),
            overtime_earnings.normalize(),
            total_earnings.normalize()
        ),
    };

    Ok(EarningsResult {
        total_earnings,
        audit_step,
    })
}
