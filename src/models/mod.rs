//! Core data models for the Payslip Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod payslip;
mod timesheet;

pub use employee::{EmployeeProfile, EmployeeRecord, LoanPlan};
pub use payslip::{
    AuditStep, AuditTrace, AuditWarning, DeductionSet, PayslipResult, RateBreakdown,
};
pub use timesheet::TimesheetInput;
