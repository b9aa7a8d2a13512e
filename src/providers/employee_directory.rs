//! In-memory employee deduction provider.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::config::{StudentLoanTerms, TaxYearConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeProfile, EmployeeRecord, LoanPlan};

use super::EmployeeDeductionProvider;
use super::contract::within_range;

/// Employee records plus the union fee and student loan terms of one tax
/// year.
///
/// # Example
///
/// ```
/// use payslip_engine::models::EmployeeRecord;
/// use payslip_engine::providers::EmployeeDirectory;
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let directory = EmployeeDirectory::new(
///     vec![EmployeeRecord {
///         id: "emp_001".to_string(),
///         full_name: "Ada Lovelace".to_string(),
///         ni_number: "QQ123456C".to_string(),
///         union_member: true,
///         student_loan: None,
///     }],
///     Decimal::new(10, 0),
///     HashMap::new(),
///     12,
/// );
/// assert_eq!(directory.lookup_union_fee("emp_001").unwrap(), Decimal::new(10, 0));
/// ```
#[derive(Debug, Clone)]
pub struct EmployeeDirectory {
    employees: HashMap<String, EmployeeRecord>,
    union_fee: Decimal,
    loan_terms: HashMap<LoanPlan, StudentLoanTerms>,
    periods_per_year: u32,
}

impl EmployeeDirectory {
    /// Creates a directory.
    ///
    /// `union_fee` is the flat per-period fee charged to union members;
    /// `loan_terms` carry annual thresholds, converted using
    /// `periods_per_year`.
    pub fn new(
        employees: impl IntoIterator<Item = EmployeeRecord>,
        union_fee: Decimal,
        loan_terms: HashMap<LoanPlan, StudentLoanTerms>,
        periods_per_year: u32,
    ) -> Self {
        Self {
            employees: employees
                .into_iter()
                .map(|employee| (employee.id.clone(), employee))
                .collect(),
            union_fee,
            loan_terms,
            periods_per_year: periods_per_year.max(1),
        }
    }

    /// Creates a directory using the student loan terms of a tax year.
    pub fn for_tax_year(
        employees: impl IntoIterator<Item = EmployeeRecord>,
        union_fee: Decimal,
        year: &TaxYearConfig,
    ) -> Self {
        Self::new(
            employees,
            union_fee,
            year.student_loans.clone(),
            year.periods_per_year,
        )
    }

    /// Finds an employee record.
    pub fn get(&self, employee_id: &str) -> EngineResult<&EmployeeRecord> {
        self.employees
            .get(employee_id)
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    /// Returns the union fee for an employee: the flat fee for members,
    /// zero otherwise.
    pub fn lookup_union_fee(&self, employee_id: &str) -> EngineResult<Decimal> {
        let employee = self.get(employee_id)?;
        Ok(if employee.union_member {
            self.union_fee
        } else {
            Decimal::ZERO
        })
    }

    /// Returns the student loan repayment for one period.
    ///
    /// The repayment is the plan rate applied to earnings above the
    /// per-period threshold, rounded down to whole units.
    ///
    /// Fails with `NotFound` for an unknown employee or a plan without
    /// terms, and with `ProviderFailure` if the repayment overflows.
    pub fn lookup_student_loan(
        &self,
        employee_id: &str,
        total_earnings: Decimal,
    ) -> EngineResult<Decimal> {
        let employee = self.get(employee_id)?;
        let Some(plan) = employee.student_loan else {
            return Ok(Decimal::ZERO);
        };
        let terms = self.loan_terms.get(&plan).ok_or_else(|| {
            EngineError::not_found("student loan terms", format!("{:?}", plan))
        })?;

        let threshold = terms.annual_threshold / Decimal::from(self.periods_per_year);
        if total_earnings <= threshold {
            return Ok(Decimal::ZERO);
        }
        let repayment = total_earnings
            .checked_sub(threshold)
            .and_then(|excess| excess.checked_mul(terms.rate));
        within_range("student_loan", repayment).map(|amount| amount.floor())
    }
}

impl EmployeeDeductionProvider for EmployeeDirectory {
    async fn union_fee(&self, employee_id: &str) -> EngineResult<Decimal> {
        self.lookup_union_fee(employee_id)
    }

    async fn student_loan_repayment(
        &self,
        employee_id: &str,
        total_earnings: Decimal,
    ) -> EngineResult<Decimal> {
        self.lookup_student_loan(employee_id, total_earnings)
    }

    async fn employee_profile(&self, employee_id: &str) -> EngineResult<EmployeeProfile> {
        self.get(employee_id).map(EmployeeRecord::profile)
    }
}
