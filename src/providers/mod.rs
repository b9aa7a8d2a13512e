//! Rule providers consumed by the payroll pipeline.
//!
//! The pipeline never interprets tax codes, bracket tables or employee
//! records itself. It asks three capability traits for amounts:
//!
//! - [`TaxProvider`]: income tax for an amount of earnings
//! - [`InsuranceProvider`]: national insurance contribution
//! - [`EmployeeDeductionProvider`]: union fee, student loan repayment and
//!   the employee profile
//!
//! Every method returns a future, so implementations are free to perform
//! I/O. The pipeline awaits them concurrently and checks each returned
//! amount against the provider contract (see [`check_amount`]).
//!
//! Reference implementations backed by configuration tables are provided
//! in [`BandedTaxProvider`], [`ThresholdInsuranceProvider`] and
//! [`EmployeeDirectory`]; [`FixedTax`], [`FixedInsurance`] and
//! [`FixedDeductions`] return fixed amounts.

mod banded_tax;
mod contract;
mod employee_directory;
mod fixed;
mod national_insurance;

use std::future::Future;

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::EmployeeProfile;

pub use banded_tax::{BandedTaxProvider, TaxCode};
pub use contract::check_amount;
pub use employee_directory::EmployeeDirectory;
pub use fixed::{FixedDeductions, FixedInsurance, FixedTax};
pub use national_insurance::ThresholdInsuranceProvider;

/// Calculates income tax.
///
/// Implementations must be deterministic, never return a negative amount,
/// and be non-decreasing in `total_earnings` for a fixed tax code and year.
pub trait TaxProvider {
    /// Returns the tax owed on `total_earnings` for one pay period.
    fn tax_amount(
        &self,
        total_earnings: Decimal,
        tax_code: &str,
        tax_year_id: &str,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send;
}

/// Calculates the statutory insurance contribution.
///
/// Same contract as [`TaxProvider`]; zero below the lower threshold.
pub trait InsuranceProvider {
    /// Returns the contribution due on `total_earnings` for one pay period.
    fn ni_contribution(
        &self,
        total_earnings: Decimal,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send;
}

/// Looks up employee-specific deductions.
///
/// Every method fails with `NotFound` for an unknown employee.
pub trait EmployeeDeductionProvider {
    /// Returns the employee's union fee. Independent of earnings; may be zero.
    fn union_fee(&self, employee_id: &str) -> impl Future<Output = EngineResult<Decimal>> + Send;

    /// Returns the student loan repayment due on `total_earnings`.
    ///
    /// Zero unless the employee has an active plan; otherwise
    /// non-decreasing in `total_earnings`.
    fn student_loan_repayment(
        &self,
        employee_id: &str,
        total_earnings: Decimal,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send;

    /// Returns the name and national insurance number shown on the payslip.
    fn employee_profile(
        &self,
        employee_id: &str,
    ) -> impl Future<Output = EngineResult<EmployeeProfile>> + Send;
}

impl<T: TaxProvider> TaxProvider for &T {
    fn tax_amount(
        &self,
        total_earnings: Decimal,
        tax_code: &str,
        tax_year_id: &str,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send {
        (**self).tax_amount(total_earnings, tax_code, tax_year_id)
    }
}

impl<T: InsuranceProvider> InsuranceProvider for &T {
    fn ni_contribution(
        &self,
        total_earnings: Decimal,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send {
        (**self).ni_contribution(total_earnings)
    }
}

impl<T: EmployeeDeductionProvider> EmployeeDeductionProvider for &T {
    fn union_fee(&self, employee_id: &str) -> impl Future<Output = EngineResult<Decimal>> + Send {
        (**self).union_fee(employee_id)
    }

    fn student_loan_repayment(
        &self,
        employee_id: &str,
        total_earnings: Decimal,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send {
        (**self).student_loan_repayment(employee_id, total_earnings)
    }

    fn employee_profile(
        &self,
        employee_id: &str,
    ) -> impl Future<Output = EngineResult<EmployeeProfile>> + Send {
        (**self).employee_profile(employee_id)
    }
}
