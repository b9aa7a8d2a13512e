//! Timesheet input for a single pay run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The raw inputs for one employee's pay run.
///
/// A timesheet is created once per pay run and never modified by the
/// pipeline.
///
/// # Example
///
/// ```
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
/// assert!(timesheet.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetInput {
    /// The employee being paid.
    pub employee_id: String,
    /// The base hourly rate.
    pub hourly_rate: Decimal,
    /// Hours actually worked in the period.
    pub hours_worked: Decimal,
    /// Hours the employee is contracted to work in the period.
    pub contractual_hours: Decimal,
    /// The employee's tax code. Opaque to the pipeline.
    pub tax_code: String,
    /// Key of the tax year whose tables apply.
    pub tax_year_id: String,
    /// The date the payment is made.
    pub pay_date: NaiveDate,
    /// The month the payment covers (e.g. "September").
    pub pay_month: String,
}

impl TimesheetInput {
    /// Checks the timesheet before any calculation or provider call.
    ///
    /// Fails with [`EngineError::InvalidInput`] if hours are negative, the
    /// hourly rate is not positive, or an identifier is blank.
    pub fn validate(&self) -> EngineResult<()> {
        if self.employee_id.trim().is_empty() {
            return Err(EngineError::invalid_input("employee_id", "must not be empty"));
        }
        if self.tax_code.trim().is_empty() {
            return Err(EngineError::invalid_input("tax_code", "must not be empty"));
        }
        if self.tax_year_id.trim().is_empty() {
            return Err(EngineError::invalid_input("tax_year_id", "must not be empty"));
        }
        if self.hours_worked < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "hours_worked",
                format!("must not be negative, got {}", self.hours_worked),
            ));
        }
        if self.contractual_hours < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "contractual_hours",
                format!("must not be negative, got {}", self.contractual_hours),
            ));
        }
        if self.hourly_rate <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "hourly_rate",
                format!("must be greater than zero, got {}", self.hourly_rate),
            ));
        }
        Ok(())
    }
}
