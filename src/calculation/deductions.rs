//! Deduction aggregation.
//!
//! Combines the tax, national insurance, student loan and union fee
//! amounts gathered from the providers into a [`DeductionSet`].

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, DeductionSet};

use super::guard::{in_range, require_non_negative};

/// The result of aggregating deductions.
#[derive(Debug, Clone)]
pub struct DeductionResult {
    /// The four components and their sum.
    pub deductions: DeductionSet,
    /// The audit step recording the aggregation.
    pub audit_step: AuditStep,
}

/// Sums tax, national insurance, student loan and union fee.
///
/// # Errors
///
/// Returns `InvalidInput` if any component is negative or the sum
/// overflows.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_total_deduction;
/// use rust_decimal::Decimal;
///
/// let result = calculate_total_deduction(
///     Decimal::new(120, 0),
///     Decimal::new(80, 0),
///     Decimal::ZERO,
///     Decimal::new(10, 0),
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.deductions.total_deduction, Decimal::new(210, 0));
/// ```
pub fn calculate_total_deduction(
    tax: Decimal,
    national_insurance: Decimal,
    student_loan: Decimal,
    union_fee: Decimal,
    step_number: u32,
) -> EngineResult<DeductionResult> {
    require_non_negative("tax", tax)?;
    require_non_negative("national_insurance", national_insurance)?;
    require_non_negative("student_loan", student_loan)?;
    require_non_negative("union_fee", union_fee)?;

    let total_deduction = in_range(
        "total_deduction",
        tax.checked_add(national_insurance)
            .and_then(|sum| sum.checked_add(student_loan))
            .and_then(|sum| sum.checked_add(union_fee)),
    )?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "total_deduction".to_string(),
        rule_name: "Total Deduction".to_string(),
        input: serde_json::json!({
            "tax": tax.normalize().to_string(),
            "national_insurance": national_insurance.normalize().to_string(),
            "student_loan": student_loan.normalize().to_string(),
            "union_fee": union_fee.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_deduction": total_deduction.normalize().to_string()
        }),
        reasoning: format!(
            "${} tax + ${} NI + ${} student loan + ${} union fee = ${}",
            tax.normalize(),
            national_insurance.normalize(),
            student_loan.normalize(),
            union_fee.normalize(),
            total_deduction.normalize()
        ),
    };

    Ok(DeductionResult {
        deductions: DeductionSet {
            tax,
            national_insurance,
            student_loan,
            union_fee,
            total_deduction,
        },
        audit_step,
    })
}
