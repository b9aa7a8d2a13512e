//! Calculation logic for the Payslip Engine.
//!
//! This module contains the pure calculation stages of a payroll run: the
//! overtime and contractual rate rules, earnings aggregation, deduction
//! aggregation, and net pay.

mod deductions;
mod earnings;
mod guard;
mod net_pay;
mod rate_rules;

pub use deductions::{DeductionResult, calculate_total_deduction};
pub use earnings::{EarningsResult, calculate_total_earnings};
pub use net_pay::{NEGATIVE_NET_PAY_WARNING, NetPayResult, calculate_net_pay};
pub use rate_rules::{
    RateRulesResult, apply_rate_rules, contractual_earning, overtime_earnings, overtime_hours,
    overtime_rate,
};
