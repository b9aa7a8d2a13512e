//! Payslip Engine
//!
//! This crate turns an employee's timesheet for one pay period into a
//! payslip: overtime and contractual earnings, income tax, national
//! insurance, student loan and union fee deductions, and net pay, with an
//! audit trace of every figure.
//!
//! Tax and insurance rules are supplied through the provider traits in
//! [`providers`]; reference implementations driven by YAML tables are
//! built by [`config::ConfigLoader`].

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod telemetry;
