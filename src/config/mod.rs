//! Configuration loading and management for the Payslip Engine.
//!
//! This module provides functionality to load payroll configuration from
//! YAML files: rate rules, per-tax-year tax and insurance tables, and the
//! employee records used by the reference deduction provider.
//!
//! # Example
//!
//! ```no_run
//! use payslip_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/uk").unwrap();
//! println!("Loaded payroll: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, ReferencePipeline};
pub use types::{
    DEFAULT_DECIMAL_PLACES, DEFAULT_OVERTIME_MULTIPLIER, EmployeesConfig, IncomeTaxTables,
    NationalInsuranceTables, PayrollConfig, PayrollFile, PayrollMetadata, RateRulesConfig,
    RoundingConfig, RoundingMode, StudentLoanTerms, TaxBand, TaxYearConfig,
};
