//! Employee model and related types.
//!
//! This module defines the employee record consumed by the reference
//! deduction provider, the student loan plans an employee can be enrolled
//! in, and the profile copied onto each payslip.

use serde::{Deserialize, Serialize};

/// A student loan repayment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPlan {
    /// Plan 1 loans.
    Plan1,
    /// Plan 2 loans.
    Plan2,
    /// Plan 4 loans.
    Plan4,
    /// Postgraduate loans.
    Postgraduate,
}

/// Represents an employee known to the payroll system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employee's full name.
    pub full_name: String,
    /// The employee's national insurance number.
    pub ni_number: String,
    /// Whether the employee pays union fees.
    #[serde(default)]
    pub union_member: bool,
    /// The employee's active student loan plan, if any.
    #[serde(default)]
    pub student_loan: Option<LoanPlan>,
}

impl EmployeeRecord {
    /// Returns the identifying details copied onto a payslip.
    ///
    /// # Examples
    ///
    /// ```
    /// use payslip_engine::models::{EmployeeRecord, LoanPlan};
    ///
    /// let employee = EmployeeRecord {
    ///     id: "emp_001".to_string(),
    ///     full_name: "Ada Lovelace".to_string(),
    ///     ni_number: "QQ123456C".to_string(),
    ///     union_member: false,
    ///     student_loan: Some(LoanPlan::Plan2),
    /// };
    /// assert_eq!(employee.profile().ni_number, "QQ123456C");
    /// ```
    pub fn profile(&self) -> EmployeeProfile {
        EmployeeProfile {
            full_name: self.full_name.clone(),
            ni_number: self.ni_number.clone(),
        }
    }
}

/// The identifying details of an employee shown on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// The employee's full name.
    pub full_name: String,
    /// The employee's national insurance number.
    pub ni_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee(student_loan: Option<LoanPlan>) -> EmployeeRecord {
        EmployeeRecord {
            id: "emp_001".to_string(),
            full_name: "Ada Lovelace".to_string(),
            ni_number: "QQ123456C".to_string(),
            union_member: true,
            student_loan,
        }
    }

    #[test]
    fn test_deserialize_employee_with_defaults() {
        let yaml = r#"
id: emp_002
full_name: Charles Babbage
ni_number: QQ654321A
"#;

        let employee: EmployeeRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(employee.id, "emp_002");
        assert!(!employee.union_member);
        assert_eq!(employee.student_loan, None);
    }

    #[test]
    fn test_deserialize_employee_with_loan_plan() {
        let json = r#"{
            "id": "emp_003",
            "full_name": "Grace Hopper",
            "ni_number": "QQ111111B",
            "union_member": true,
            "student_loan": "postgraduate"
        }"#;

        let employee: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert!(employee.union_member);
        assert_eq!(employee.student_loan, Some(LoanPlan::Postgraduate));
    }

    #[test]
    fn test_profile_copies_name_and_ni_number() {
        let profile = create_test_employee(None).profile();
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.ni_number, "QQ123456C");
    }

    #[test]
    fn test_loan_plan_serialization() {
        assert_eq!(
            serde_json::to_string(&LoanPlan::Plan1).unwrap(),
            "\"plan1\""
        );
        assert_eq!(
            serde_json::to_string(&LoanPlan::Postgraduate).unwrap(),
            "\"postgraduate\""
        );
    }
}
