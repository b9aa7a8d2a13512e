//! The payroll computation pipeline.
//!
//! A run moves through [`PipelineState`]s strictly in order:
//!
//! ```text
//! Initialized -> RatesComputed -> EarningsComputed -> DeductionsComputed -> Finalized
//! ```
//!
//! The tax, insurance, student loan and union fee lookups between
//! `EarningsComputed` and `DeductionsComputed` are independent and run
//! concurrently; aggregation starts only once all of them have succeeded.

mod orchestrator;
mod state;

pub use orchestrator::PayrollPipeline;
pub use state::PipelineState;
