//! Providers that return fixed amounts.
//!
//! Useful for reconciling a payslip against known figures and in tests.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::EmployeeProfile;

use super::{EmployeeDeductionProvider, InsuranceProvider, TaxProvider};

/// Tax provider returning the same amount for any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTax(pub Decimal);

impl TaxProvider for FixedTax {
    async fn tax_amount(
        &self,
        _total_earnings: Decimal,
        _tax_code: &str,
        _tax_year_id: &str,
    ) -> EngineResult<Decimal> {
        Ok(self.0)
    }
}

/// Insurance provider returning the same amount for any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInsurance(pub Decimal);

impl InsuranceProvider for FixedInsurance {
    async fn ni_contribution(&self, _total_earnings: Decimal) -> EngineResult<Decimal> {
        Ok(self.0)
    }
}

/// Employee deduction provider returning the same amounts for any employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDeductions {
    /// Union fee returned for every employee.
    pub union_fee: Decimal,
    /// Student loan repayment returned for every employee.
    pub student_loan: Decimal,
    /// Profile returned for every employee.
    pub profile: EmployeeProfile,
}

impl FixedDeductions {
    /// Creates a provider with a placeholder profile.
    pub fn new(union_fee: Decimal, student_loan: Decimal) -> Self {
        Self {
            union_fee,
            student_loan,
            profile: EmployeeProfile {
                full_name: "Unknown".to_string(),
                ni_number: String::new(),
            },
        }
    }
}

impl EmployeeDeductionProvider for FixedDeductions {
    async fn union_fee(&self, _employee_id: &str) -> EngineResult<Decimal> {
        Ok(self.union_fee)
    }

    async fn student_loan_repayment(
        &self,
        _employee_id: &str,
        _total_earnings: Decimal,
    ) -> EngineResult<Decimal> {
        Ok(self.student_loan)
    }

    async fn employee_profile(&self, _employee_id: &str) -> EngineResult<EmployeeProfile> {
        Ok(self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_providers_ignore_inputs() {
        let tax = FixedTax(Decimal::new(120, 0));
        let insurance = FixedInsurance(Decimal::new(80, 0));
        let deductions = FixedDeductions::new(Decimal::new(10, 0), Decimal::ZERO);

        assert_eq!(
            tax.tax_amount(Decimal::ONE, "BR", "any").await.unwrap(),
            Decimal::new(120, 0)
        );
        assert_eq!(
            insurance.ni_contribution(Decimal::MAX).await.unwrap(),
            Decimal::new(80, 0)
        );
        assert_eq!(
            deductions.union_fee("anyone").await.unwrap(),
            Decimal::new(10, 0)
        );
        assert_eq!(
            deductions
                .student_loan_repayment("anyone", Decimal::ONE)
                .await
                .unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            deductions.employee_profile("anyone").await.unwrap().full_name,
            "Unknown"
        );
    }
}
