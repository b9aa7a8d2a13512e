//! Error types for the Payslip Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing a payslip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the Payslip Engine.
///
/// Pure calculation stages, providers and the configuration loader all
/// return this error type. The pipeline wraps it in a [`PipelineError`]
/// tagged with the stage that failed.
///
/// # Example
///
/// ```
/// use payslip_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "employee".to_string(),
///     key: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: emp_404");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A numeric input was negative or otherwise invalid.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// A referenced employee, tax year or tax code does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: String,
        /// The key that was not found.
        key: String,
    },

    /// A provider returned a value that breaks its contract.
    #[error("Provider '{provider}' violated its contract: {message}")]
    ProviderContractViolation {
        /// The provider that returned the value.
        provider: String,
        /// A description of the violation.
        message: String,
    },

    /// A provider failed to produce a value (for example a backend outage).
    #[error("Provider '{provider}' failed: {message}")]
    ProviderFailure {
        /// The provider that failed.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The run was cancelled by the caller.
    #[error("Payroll run cancelled")]
    Cancelled,

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::NotFound`].
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// The unit of pipeline work during which a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Input validation and overtime/contractual rate rules.
    RateRules,
    /// Aggregation of contractual and overtime earnings.
    Earnings,
    /// Provider fan-out and deduction aggregation.
    Deductions,
    /// Net pay calculation and payslip assembly.
    NetPay,
}

impl PipelineStage {
    /// Returns the stable snake_case name of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::RateRules => "rate_rules",
            PipelineStage::Earnings => "earnings",
            PipelineStage::Deductions => "deductions",
            PipelineStage::NetPay => "net_pay",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed payroll run, tagged with the stage that failed.
///
/// # Example
///
/// ```
/// use payslip_engine::error::{EngineError, PipelineError, PipelineStage};
///
/// let error = PipelineError::new(PipelineStage::Deductions, EngineError::Cancelled);
/// assert_eq!(
///     error.to_string(),
///     "Payroll run failed at stage 'deductions': Payroll run cancelled"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Payroll run failed at stage '{stage}': {source}")]
pub struct PipelineError {
    /// The stage that failed.
    pub stage: PipelineStage,
    /// The underlying error.
    #[source]
    pub source: EngineError,
}

impl PipelineError {
    /// Creates a new pipeline error.
    pub fn new(stage: PipelineStage, source: EngineError) -> Self {
        Self { stage, source }
    }

    /// Returns the underlying engine error.
    pub fn kind(&self) -> &EngineError {
        &self.source
    }
}
