//! Overtime and contractual rate rules.
//!
//! This module provides the functions that turn an hourly rate and the
//! hours on a timesheet into overtime hours, the overtime rate, and the
//! contractual and overtime earnings.

use rust_decimal::Decimal;

use crate::config::RateRulesConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, RateBreakdown, TimesheetInput};

use super::guard::{in_range, require_non_negative};

/// The result of applying the rate rules to a timesheet.
#[derive(Debug, Clone)]
pub struct RateRulesResult {
    /// The derived overtime and contractual figures.
    pub breakdown: RateBreakdown,
    /// One audit step per rule, in application order.
    pub audit_steps: Vec<AuditStep>,
}

/// Returns the hours worked beyond contractual hours.
///
/// # Errors
///
/// Returns `InvalidInput` if either argument is negative.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::overtime_hours;
/// use rust_decimal::Decimal;
///
/// let hours = overtime_hours(Decimal::new(45, 0), Decimal::new(40, 0)).unwrap();
/// assert_eq!(hours, Decimal::new(5, 0));
///
/// let none = overtime_hours(Decimal::new(30, 0), Decimal::new(40, 0)).unwrap();
/// assert_eq!(none, Decimal::ZERO);
/// ```
pub fn overtime_hours(hours_worked: Decimal, contractual_hours: Decimal) -> EngineResult<Decimal> {
    require_non_negative("hours_worked", hours_worked)?;
    require_non_negative("contractual_hours", contractual_hours)?;

    if hours_worked > contractual_hours {
        Ok(hours_worked - contractual_hours)
    } else {
        Ok(Decimal::ZERO)
    }
}

/// Returns the hourly rate paid for overtime.
///
/// # Errors
///
/// Returns `InvalidInput` if the hourly rate or multiplier is not positive,
/// or if their product overflows.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::overtime_rate;
/// use payslip_engine::config::DEFAULT_OVERTIME_MULTIPLIER;
/// use rust_decimal::Decimal;
///
/// let rate = overtime_rate(Decimal::new(20, 0), DEFAULT_OVERTIME_MULTIPLIER).unwrap();
/// assert_eq!(rate, Decimal::new(30, 0));
/// ```
pub fn overtime_rate(hourly_rate: Decimal, multiplier: Decimal) -> EngineResult<Decimal> {
    if hourly_rate <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "hourly_rate",
            format!("must be greater than zero, got {}", hourly_rate),
        ));
    }
    if multiplier <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "overtime_multiplier",
            format!("must be greater than zero, got {}", multiplier),
        ));
    }
    in_range("overtime_rate", hourly_rate.checked_mul(multiplier))
}

/// Returns earnings for the lesser of hours worked and contractual hours.
///
/// An employee who works fewer than their contracted hours is paid only
/// for the hours actually worked.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::contractual_earning;
/// use rust_decimal::Decimal;
///
/// // Under-worked: paid for 30 hours, not 40.
/// let paid = contractual_earning(Decimal::new(40, 0), Decimal::new(30, 0), Decimal::new(15, 0));
/// assert_eq!(paid.unwrap(), Decimal::new(450, 0));
/// ```
pub fn contractual_earning(
    contractual_hours: Decimal,
    hours_worked: Decimal,
    hourly_rate: Decimal,
) -> EngineResult<Decimal> {
    require_non_negative("contractual_hours", contractual_hours)?;
    require_non_negative("hours_worked", hours_worked)?;
    require_non_negative("hourly_rate", hourly_rate)?;

    in_range(
        "contractual_earnings",
        hourly_rate.checked_mul(hours_worked.min(contractual_hours)),
    )
}

/// Returns the earnings for overtime hours.
///
/// Zero whenever `overtime_hours` is zero, regardless of the rate.
///
/// # Errors
///
/// Returns `InvalidInput` if the product overflows.
pub fn overtime_earnings(
    overtime_rate: Decimal,
    overtime_hours: Decimal,
) -> EngineResult<Decimal> {
    if overtime_hours.is_zero() {
        return Ok(Decimal::ZERO);
    }
    in_range("overtime_earnings", overtime_rate.checked_mul(overtime_hours))
}

/// Applies every rate rule to a timesheet.
///
/// Earnings are rounded to the configured currency precision; the overtime
/// rate is kept unrounded.
///
/// # Arguments
///
/// * `timesheet` - The timesheet being paid
/// * `config` - Overtime multiplier and rounding policy
/// * `first_step` - The step number of the first audit step produced
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::apply_rate_rules;
/// use payslip_engine::config::RateRulesConfig;
/// use payslip_engine::models::TimesheetInput;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let timesheet = TimesheetInput {
///     employee_id: "emp_001".to_string(),
///     hourly_rate: Decimal::new(20, 0),
///     hours_worked: Decimal::new(45, 0),
///     contractual_hours: Decimal::new(40, 0),
///     tax_code: "1257L".to_string(),
///     tax_year_id: "2025-26".to_string(),
///     pay_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
///     pay_month: "September".to_string(),
/// };
///
/// let result = apply_rate_rules(&timesheet, &RateRulesConfig::default(), 1).unwrap();
/// assert_eq!(result.breakdown.contractual_earnings, Decimal::new(800, 0));
/// assert_eq!(result.breakdown.overtime_earnings, Decimal::new(150, 0));
/// assert_eq!(result.audit_steps.len(), 4);
/// ```
pub fn apply_rate_rules(
    timesheet: &TimesheetInput,
    config: &RateRulesConfig,
    first_step: u32,
) -> EngineResult<RateRulesResult> {
    let rounding = config.rounding;

    let ot_hours = overtime_hours(timesheet.hours_worked, timesheet.contractual_hours)?;
    let ot_rate = overtime_rate(timesheet.hourly_rate, config.overtime_multiplier)?;
    let contractual = rounding.apply(contractual_earning(
        timesheet.contractual_hours,
        timesheet.hours_worked,
        timesheet.hourly_rate,
    )?);
    let ot_earnings = rounding.apply(overtime_earnings(ot_rate, ot_hours)?);

    let hours_reasoning = if ot_hours > Decimal::ZERO {
        format!(
            "{} hours worked exceeds {} contractual hours by {} hours",
            timesheet.hours_worked.normalize(),
            timesheet.contractual_hours.normalize(),
            ot_hours.normalize()
        )
    } else {
        format!(
            "{} hours worked does not exceed {} contractual hours, no overtime",
            timesheet.hours_worked.normalize(),
            timesheet.contractual_hours.normalize()
        )
    };

    let paid_hours = timesheet.hours_worked.min(timesheet.contractual_hours);
    let contractual_reasoning = if timesheet.hours_worked < timesheet.contractual_hours {
        format!(
            "Paid for {} hours actually worked (below {} contractual hours) at ${}",
            paid_hours.normalize(),
            timesheet.contractual_hours.normalize(),
            timesheet.hourly_rate.normalize()
        )
    } else {
        format!(
            "Paid for {} contractual hours at ${}",
            paid_hours.normalize(),
            timesheet.hourly_rate.normalize()
        )
    };

    let audit_steps = vec![
        AuditStep {
            step_number: first_step,
            rule_id: "overtime_hours".to_string(),
            rule_name: "Overtime Hours".to_string(),
            input: serde_json::json!({
                "hours_worked": timesheet.hours_worked.normalize().to_string(),
                "contractual_hours": timesheet.contractual_hours.normalize().to_string()
            }),
            output: serde_json::json!({
                "overtime_hours": ot_hours.normalize().to_string()
            }),
            reasoning: hours_reasoning,
        },
        AuditStep {
            step_number: first_step + 1,
            rule_id: "overtime_rate".to_string(),
            rule_name: "Overtime Rate".to_string(),
            input: serde_json::json!({
                "hourly_rate": timesheet.hourly_rate.normalize().to_string(),
                "multiplier": config.overtime_multiplier.normalize().to_string()
            }),
            output: serde_json::json!({
                "overtime_rate": ot_rate.normalize().to_string()
            }),
            reasoning: format!(
                "${} x {} = ${}",
                timesheet.hourly_rate.normalize(),
                config.overtime_multiplier.normalize(),
                ot_rate.normalize()
            ),
        },
        AuditStep {
            step_number: first_step + 2,
            rule_id: "contractual_earnings".to_string(),
            rule_name: "Contractual Earnings".to_string(),
            input: serde_json::json!({
                "hourly_rate": timesheet.hourly_rate.normalize().to_string(),
                "hours_worked": timesheet.hours_worked.normalize().to_string(),
                "contractual_hours": timesheet.contractual_hours.normalize().to_string()
            }),
            output: serde_json::json!({
                "paid_hours": paid_hours.normalize().to_string(),
                "contractual_earnings": contractual.normalize().to_string()
            }),
            reasoning: contractual_reasoning,
        },
        AuditStep {
            step_number: first_step + 3,
            rule_id: "overtime_earnings".to_string(),
            rule_name: "Overtime Earnings".to_string(),
            input: serde_json::json!({
                "overtime_rate": ot_rate.normalize().to_string(),
                "overtime_hours": ot_hours.normalize().to_string()
            }),
            output: serde_json::json!({
                "overtime_earnings": ot_earnings.normalize().to_string()
            }),
            reasoning: format!(
                "{} overtime hours x ${} = ${}",
                ot_hours.normalize(),
                ot_rate.normalize(),
                ot_earnings.normalize()
            ),
        },
    ];

    Ok(RateRulesResult {
        breakdown: RateBreakdown {
            overtime_hours: ot_hours,
            overtime_rate: ot_rate,
            contractual_earnings: contractual,
            overtime_earnings: ot_earnings,
        },
        audit_steps,
    })
}
