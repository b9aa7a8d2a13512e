//! `payslip`: compute a payslip from a timesheet file.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use payslip_engine::config::ConfigLoader;
use payslip_engine::error::{EngineError, PipelineError};
use payslip_engine::models::TimesheetInput;
use payslip_engine::telemetry::{self, TelemetryError};

#[derive(Parser, Debug)]
#[command(
    name = "payslip",
    about = "Compute a payslip with a full audit trace from a timesheet",
    version
)]
struct Cli {
    /// Configuration directory (e.g. ./config/uk)
    #[arg(long, default_value = "./config/uk")]
    config: PathBuf,
    /// Timesheet JSON file, or '-' to read from stdin
    #[arg(long)]
    timesheet: String,
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Config(#[from] EngineError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to read timesheet '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid timesheet JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("payslip error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let loader = ConfigLoader::load(&cli.config)?;
    let timesheet: TimesheetInput = serde_json::from_str(&read_timesheet(&cli.timesheet)?)?;
    info!(
        config = %cli.config.display(),
        employee_id = %timesheet.employee_id,
        tax_year_id = %timesheet.tax_year_id,
        "Computing payslip"
    );

    let payslip = loader.compute_payslip(&timesheet).await?;

    println!("{}", serde_json::to_string_pretty(&payslip)?);
    Ok(())
}

fn read_timesheet(path: &str) -> Result<String, CliError> {
    let read_error = |source| CliError::Read {
        path: path.to_string(),
        source,
    };
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(read_error)?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).map_err(read_error)
}
