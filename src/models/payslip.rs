//! Payslip models for the Payslip Engine.
//!
//! This module contains the [`PayslipResult`] type and the intermediate
//! values each pipeline stage contributes to it: the rate breakdown, the
//! deduction set and the audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TimesheetInput;

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag results that were produced but need attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a payroll run.
///
/// # Example
///
/// ```
/// use payslip_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert!(trace.steps.is_empty());
/// assert!(trace.warnings.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Overtime and contractual figures derived from a timesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBreakdown {
    /// Hours worked beyond contractual hours.
    pub overtime_hours: Decimal,
    /// The hourly rate paid for overtime.
    pub overtime_rate: Decimal,
    /// Earnings for hours up to the contractual ceiling.
    pub contractual_earnings: Decimal,
    /// Earnings for overtime hours.
    pub overtime_earnings: Decimal,
}

/// The four deductions taken from a payslip and their sum.
///
/// # Example
///
/// ```
/// use payslip_engine::models::DeductionSet;
/// use rust_decimal::Decimal;
///
/// let deductions = DeductionSet {
///     tax: Decimal::new(120, 0),
///     national_insurance: Decimal::new(80, 0),
///     student_loan: Decimal::ZERO,
///     union_fee: Decimal::new(10, 0),
///     total_deduction: Decimal::new(210, 0),
/// };
/// assert_eq!(deductions.component_sum(), deductions.total_deduction);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSet {
    /// Income tax.
    pub tax: Decimal,
    /// National insurance contribution.
    pub national_insurance: Decimal,
    /// Student loan repayment.
    pub student_loan: Decimal,
    /// Union fee.
    pub union_fee: Decimal,
    /// Sum of the four deductions.
    pub total_deduction: Decimal,
}

impl DeductionSet {
    /// Returns the sum of the four individual components.
    pub fn component_sum(&self) -> Decimal {
        self.tax + self.national_insurance + self.student_loan + self.union_fee
    }
}

/// The complete, immutable result of a payroll run.
///
/// Serializes to a flat record: every timesheet, rate, earnings and
/// deduction figure is a named field, alongside the net payment, the
/// `anomalous` flag and the audit trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipResult {
    /// The timesheet the payslip was computed from.
    #[serde(flatten)]
    pub timesheet: TimesheetInput,
    /// Human-readable label of the tax year (e.g., "2025/2026"), when the
    /// caller resolved one from its tax year tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_year_label: Option<String>,
    /// The employee's full name.
    pub full_name: String,
    /// The employee's national insurance number.
    pub ni_number: String,
    /// Overtime and contractual figures.
    #[serde(flatten)]
    pub rates: RateBreakdown,
    /// Contractual plus overtime earnings.
    pub total_earnings: Decimal,
    /// Deductions taken from total earnings.
    #[serde(flatten)]
    pub deductions: DeductionSet,
    /// Total earnings minus total deduction. May be negative.
    pub net_payment: Decimal,
    /// True when deductions exceed earnings.
    pub anomalous: bool,
    /// Record of every rule applied during the run.
    pub audit_trace: AuditTrace,
}

impl PayslipResult {
    /// Finds the audit step recorded for a rule.
    pub fn audit_step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.audit_trace.steps.iter().find(|s| s.rule_id == rule_id)
    }

    /// Returns the amount by which deductions exceed earnings, or zero.
    pub fn shortfall(&self) -> Decimal {
        if self.net_payment < Decimal::ZERO {
            -self.net_payment
        } else {
            Decimal::ZERO
        }
    }
}
