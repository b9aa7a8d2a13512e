//! The payroll pipeline orchestrator.
//!
//! Runs the calculation stages in order, fans out to the providers for the
//! four deductions, and assembles the [`PayslipResult`].

use futures::future::{AbortRegistration, Abortable, join_all};
use rust_decimal::Decimal;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::calculation::{
    apply_rate_rules, calculate_net_pay, calculate_total_deduction, calculate_total_earnings,
};
use crate::config::RateRulesConfig;
use crate::error::{EngineError, EngineResult, PipelineError, PipelineStage};
use crate::models::{AuditStep, AuditTrace, EmployeeProfile, PayslipResult, TimesheetInput};
use crate::providers::{EmployeeDeductionProvider, InsuranceProvider, TaxProvider, check_amount};

use super::state::PipelineState;

/// Computes payslips from timesheets.
///
/// A pipeline holds the rate rules and the three providers. It keeps no
/// state between runs, so one pipeline can serve any number of runs
/// concurrently.
///
/// # Example
///
/// ```
/// use payslip_engine::config::RateRulesConfig;
/// use payslip_engine::models::TimesheetInput;
/// use payslip_engine::pipeline::PayrollPipeline;
/// use payslip_engine::providers::{FixedDeductions, FixedInsurance, FixedTax};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipeline = PayrollPipeline::new(
///     RateRulesConfig::default(),
///     FixedTax(Decimal::new(120, 0)),
///     FixedInsurance(Decimal::new(80, 0)),
///     FixedDeductions::new(Decimal::new(10, 0), Decimal::ZERO),
/// )
/// .unwrap();
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
/// let payslip = pipeline.run(&timesheet).await.unwrap();
/// assert_eq!(payslip.total_earnings, Decimal::new(950, 0));
/// assert_eq!(payslip.net_payment, Decimal::new(740, 0));
/// assert!(!payslip.anomalous);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PayrollPipeline<T, I, D> {
    rules: RateRulesConfig,
    tax: T,
    insurance: I,
    deductions: D,
}

/// Amounts gathered from the providers before aggregation.
struct ProviderAmounts {
    tax: Decimal,
    national_insurance: Decimal,
    student_loan: Decimal,
    union_fee: Decimal,
}

impl<T, I, D> PayrollPipeline<T, I, D>
where
    T: TaxProvider,
    I: InsuranceProvider,
    D: EmployeeDeductionProvider,
{
    /// Creates a pipeline.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the rate rules are unusable.
    pub fn new(rules: RateRulesConfig, tax: T, insurance: I, deductions: D) -> EngineResult<Self> {
        rules.validate()?;
        Ok(Self {
            rules,
            tax,
            insurance,
            deductions,
        })
    }

    /// Returns the rate rules this pipeline applies.
    pub fn rules(&self) -> &RateRulesConfig {
        &self.rules
    }

    /// Computes the payslip for one timesheet.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] tagged with the failing stage. No
    /// partial payslip is ever returned.
    pub async fn run(&self, timesheet: &TimesheetInput) -> Result<PayslipResult, PipelineError> {
        self.execute(timesheet, None).await
    }

    /// Computes the payslip for one timesheet, abandoning the run if the
    /// matching [`futures::future::AbortHandle`] is aborted.
    ///
    /// Aborting drops every in-flight provider call and fails the run with
    /// [`EngineError::Cancelled`].
    pub async fn run_cancellable(
        &self,
        timesheet: &TimesheetInput,
        registration: AbortRegistration,
    ) -> Result<PayslipResult, PipelineError> {
        self.execute(timesheet, Some(registration)).await
    }

    /// Computes payslips for many timesheets concurrently.
    ///
    /// Runs are independent: one failure does not affect the others.
    /// Results are returned in input order.
    pub async fn run_batch(
        &self,
        timesheets: &[TimesheetInput],
    ) -> Vec<Result<PayslipResult, PipelineError>> {
        join_all(timesheets.iter().map(|timesheet| self.run(timesheet))).await
    }

    async fn execute(
        &self,
        timesheet: &TimesheetInput,
        cancel: Option<AbortRegistration>,
    ) -> Result<PayslipResult, PipelineError> {
        let span = info_span!(
            "payroll_run",
            run_id = %Uuid::new_v4(),
            employee_id = %timesheet.employee_id
        );
        self.stages(timesheet, cancel).instrument(span).await
    }

    async fn stages(
        &self,
        timesheet: &TimesheetInput,
        cancel: Option<AbortRegistration>,
    ) -> Result<PayslipResult, PipelineError> {
        let mut state = PipelineState::Initialized;
        debug!(state = %state, "Payroll run started");

        // Rate rules
        let rates = timesheet
            .validate()
            .and_then(|()| apply_rate_rules(timesheet, &self.rules, 1))
            .map_err(|e| failed(PipelineStage::RateRules, e))?;
        let mut steps = rates.audit_steps;
        let breakdown = rates.breakdown;
        state = state.advance();
        debug!(state = %state, overtime_hours = %breakdown.overtime_hours, "Rates computed");

        // Earnings
        let earnings = calculate_total_earnings(
            breakdown.overtime_earnings,
            breakdown.contractual_earnings,
            next_step(&steps),
        )
        .map_err(|e| failed(PipelineStage::Earnings, e))?;
        let total_earnings = earnings.total_earnings;
        steps.push(earnings.audit_step);
        state = state.advance();
        debug!(state = %state, total_earnings = %total_earnings, "Earnings computed");

        // Deductions: fan out to the providers, join, then aggregate
        let (amounts, profile) = match cancel {
            Some(registration) => {
                Abortable::new(self.gather(timesheet, total_earnings), registration)
                    .await
                    .unwrap_or(Err(EngineError::Cancelled))
            }
            None => self.gather(timesheet, total_earnings).await,
        }
        .map_err(|e| failed(PipelineStage::Deductions, e))?;

        let first_provider_step = next_step(&steps);
        steps.extend(provider_steps(
            first_provider_step,
            timesheet,
            total_earnings,
            &amounts,
        ));

        let deduction = calculate_total_deduction(
            amounts.tax,
            amounts.national_insurance,
            amounts.student_loan,
            amounts.union_fee,
            next_step(&steps),
        )
        .map_err(|e| failed(PipelineStage::Deductions, e))?;
        let deductions = deduction.deductions;
        steps.push(deduction.audit_step);
        state = state.advance();
        debug!(
            state = %state,
            total_deduction = %deductions.total_deduction,
            "Deductions computed"
        );

        // Net pay
        let net = calculate_net_pay(total_earnings, deductions.total_deduction, next_step(&steps))
            .map_err(|e| failed(PipelineStage::NetPay, e))?;
        steps.push(net.audit_step);
        let warnings: Vec<_> = net.warning.into_iter().collect();
        state = state.advance();

        if net.anomalous {
            warn!(
                state = %state,
                total_earnings = %total_earnings,
                total_deduction = %deductions.total_deduction,
                net_payment = %net.net_payment,
                "Deductions exceed earnings, payslip flagged as anomalous"
            );
        }
        info!(
            state = %state,
            total_earnings = %total_earnings,
            total_deduction = %deductions.total_deduction,
            net_payment = %net.net_payment,
            "Payslip computed"
        );

        Ok(PayslipResult {
            timesheet: timesheet.clone(),
            tax_year_label: None,
            full_name: profile.full_name,
            ni_number: profile.ni_number,
            rates: breakdown,
            total_earnings,
            deductions,
            net_payment: net.net_payment,
            anomalous: net.anomalous,
            audit_trace: AuditTrace { steps, warnings },
        })
    }

    /// Calls every provider concurrently and checks each amount against
    /// the provider contract before rounding it.
    async fn gather(
        &self,
        timesheet: &TimesheetInput,
        total_earnings: Decimal,
    ) -> EngineResult<(ProviderAmounts, EmployeeProfile)> {
        let (tax, national_insurance, student_loan, union_fee, profile) = tokio::try_join!(
            self.tax
                .tax_amount(total_earnings, &timesheet.tax_code, &timesheet.tax_year_id),
            self.insurance.ni_contribution(total_earnings),
            self.deductions
                .student_loan_repayment(&timesheet.employee_id, total_earnings),
            self.deductions.union_fee(&timesheet.employee_id),
            self.deductions.employee_profile(&timesheet.employee_id),
        )?;

        let rounding = self.rules.rounding;
        let amounts = ProviderAmounts {
            tax: rounding.apply(check_amount("tax", tax)?),
            national_insurance: rounding.apply(check_amount("insurance", national_insurance)?),
            student_loan: rounding.apply(check_amount("student_loan", student_loan)?),
            union_fee: rounding.apply(check_amount("union_fee", union_fee)?),
        };
        Ok((amounts, profile))
    }
}

fn failed(stage: PipelineStage, error: EngineError) -> PipelineError {
    warn!(stage = %stage, error = %error, "Payroll run failed");
    PipelineError::new(stage, error)
}

fn next_step(steps: &[AuditStep]) -> u32 {
    steps.last().map_or(1, |step| step.step_number + 1)
}

/// Audit steps for the provider amounts, in a fixed order so traces do not
/// depend on which provider finished first.
fn provider_steps(
    first_step: u32,
    timesheet: &TimesheetInput,
    total_earnings: Decimal,
    amounts: &ProviderAmounts,
) -> Vec<AuditStep> {
    let earnings = total_earnings.normalize().to_string();
    let entries = [
        (
            "tax",
            "Income Tax",
            serde_json::json!({
                "total_earnings": earnings,
                "tax_code": timesheet.tax_code,
                "tax_year_id": timesheet.tax_year_id
            }),
            amounts.tax,
        ),
        (
            "national_insurance",
            "National Insurance",
            serde_json::json!({ "total_earnings": earnings }),
            amounts.national_insurance,
        ),
        (
            "student_loan",
            "Student Loan Repayment",
            serde_json::json!({
                "employee_id": timesheet.employee_id,
                "total_earnings": earnings
            }),
            amounts.student_loan,
        ),
        (
            "union_fee",
            "Union Fee",
            serde_json::json!({ "employee_id": timesheet.employee_id }),
            amounts.union_fee,
        ),
    ];

    entries
        .into_iter()
        .zip(first_step..)
        .map(|((rule_id, rule_name, input, amount), step_number)| AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output: serde_json::json!({ "amount": amount.normalize().to_string() }),
            reasoning: format!("{} provider returned ${}", rule_name, amount.normalize()),
        })
        .collect()
}
