//! Pipeline run states.

use serde::{Deserialize, Serialize};

/// The states a payroll run passes through, in order.
///
/// Runs move forward one state at a time and never revisit a state.
///
/// # Example
///
/// ```
/// use payslip_engine::pipeline::PipelineState;
///
/// let state = PipelineState::Initialized.advance().advance();
/// assert_eq!(state, PipelineState::EarningsComputed);
/// assert!(PipelineState::Finalized.advance().is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// The run has been created from a timesheet.
    Initialized,
    /// Overtime and contractual figures are known.
    RatesComputed,
    /// Total earnings are known.
    EarningsComputed,
    /// All four deductions have been gathered and summed.
    DeductionsComputed,
    /// The payslip has been assembled.
    Finalized,
}

impl PipelineState {
    /// Returns the next state. `Finalized` is terminal and stays put.
    pub fn advance(self) -> Self {
        match self {
            PipelineState::Initialized => PipelineState::RatesComputed,
            PipelineState::RatesComputed => PipelineState::EarningsComputed,
            PipelineState::EarningsComputed => PipelineState::DeductionsComputed,
            PipelineState::DeductionsComputed => PipelineState::Finalized,
            PipelineState::Finalized => PipelineState::Finalized,
        }
    }

    /// Returns true for the terminal state.
    pub fn is_terminal(&self) -> bool {
        *self == PipelineState::Finalized
    }

    /// Returns the stable snake_case name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Initialized => "initialized",
            PipelineState::RatesComputed => "rates_computed",
            PipelineState::EarningsComputed => "earnings_computed",
            PipelineState::DeductionsComputed => "deductions_computed",
            PipelineState::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
