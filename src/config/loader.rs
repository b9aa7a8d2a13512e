//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files, and for building the reference
//! providers and pipeline from them.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult, PipelineError, PipelineStage};
use crate::models::{EmployeeRecord, PayslipResult, TimesheetInput};
use crate::pipeline::PayrollPipeline;
use crate::providers::{BandedTaxProvider, EmployeeDirectory, ThresholdInsuranceProvider};

use super::types::{
    EmployeesConfig, PayrollConfig, PayrollFile, PayrollMetadata, RateRulesConfig, TaxYearConfig,
};

/// A pipeline wired to the reference providers.
pub type ReferencePipeline =
    PayrollPipeline<BandedTaxProvider, ThresholdInsuranceProvider, EmployeeDirectory>;

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query tax years and employees, and to build
/// the reference pipeline.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/uk/
/// ├── payroll.yaml        # Metadata and rate rules
/// ├── employees.yaml      # Union fee and employee records
/// └── tax_years/
///     └── 2025-26.yaml    # Tax, NI and student loan tables
/// ```
///
/// # Example
///
/// ```no_run
/// use payslip_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/uk").unwrap();
///
/// let year = loader.tax_year("2025-26").unwrap();
/// println!("Tax year: {}", year.label);
///
/// let pipeline = loader.pipeline_for("2025-26").unwrap();
/// println!("Overtime multiplier: {}", pipeline.rules().overtime_multiplier);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/uk")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A tax year's tables are inconsistent or its id is repeated
    /// - The rate rules are unusable
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payslip_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/uk")?;
    /// # Ok::<(), payslip_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        // Load payroll.yaml
        let payroll = Self::load_yaml::<PayrollFile>(&path.join("payroll.yaml"))?;
        payroll.rate_rules.validate()?;

        // Load employees.yaml
        let employees = Self::load_yaml::<EmployeesConfig>(&path.join("employees.yaml"))?;
        Self::check_employees(&employees)?;

        // Load all tax year files from the tax_years directory
        let tax_years = Self::load_tax_years(&path.join("tax_years"))?;

        let config = PayrollConfig::new(payroll.metadata, payroll.rate_rules, tax_years, employees);

        tracing::debug!(
            path = %path.display(),
            tax_years = config.tax_years().len(),
            employees = config.employees().employees.len(),
            "Payroll configuration loaded"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all tax year files from the tax_years directory.
    fn load_tax_years(dir: &Path) -> EngineResult<Vec<TaxYearConfig>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut tax_years: Vec<TaxYearConfig> = Vec::new();
        let mut seen = HashSet::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let year = Self::load_yaml::<TaxYearConfig>(&path)?;
                year.validate()?;
                if !seen.insert(year.id.clone()) {
                    return Err(EngineError::ConfigParseError {
                        path: path.display().to_string(),
                        message: format!("duplicate tax year '{}'", year.id),
                    });
                }
                tax_years.push(year);
            }
        }

        if tax_years.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax year files found)", dir_str),
            });
        }

        Ok(tax_years)
    }

    fn check_employees(config: &EmployeesConfig) -> EngineResult<()> {
        if config.union_fee < Decimal::ZERO {
            return Err(EngineError::invalid_input("union_fee", "must not be negative"));
        }
        let mut seen = HashSet::new();
        for employee in &config.employees {
            if !seen.insert(employee.id.as_str()) {
                return Err(EngineError::invalid_input(
                    "employees",
                    format!("duplicate employee id '{}'", employee.id),
                ));
            }
        }
        Ok(())
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the payroll metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        self.config.metadata()
    }

    /// Returns the rate rules.
    pub fn rate_rules(&self) -> &RateRulesConfig {
        self.config.rate_rules()
    }

    /// Gets a tax year by its id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payslip_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/uk")?;
    /// let year = loader.tax_year("2025-26")?;
    /// println!("{} pay periods", year.periods_per_year);
    /// # Ok::<(), payslip_engine::error::EngineError>(())
    /// ```
    pub fn tax_year(&self, id: &str) -> EngineResult<&TaxYearConfig> {
        self.config
            .tax_years()
            .get(id)
            .ok_or_else(|| EngineError::not_found("tax year", id))
    }

    /// Gets an employee record by id.
    pub fn get_employee(&self, id: &str) -> EngineResult<&EmployeeRecord> {
        self.config
            .employees()
            .employees
            .iter()
            .find(|employee| employee.id == id)
            .ok_or_else(|| EngineError::not_found("employee", id))
    }

    /// Builds a tax provider covering every loaded tax year.
    pub fn tax_provider(&self) -> BandedTaxProvider {
        BandedTaxProvider::new(self.config.tax_years().values().cloned())
    }

    /// Builds the insurance provider for one tax year.
    pub fn insurance_provider(&self, tax_year_id: &str) -> EngineResult<ThresholdInsuranceProvider> {
        self.tax_year(tax_year_id).map(ThresholdInsuranceProvider::for_tax_year)
    }

    /// Builds the employee deduction provider for one tax year.
    pub fn employee_directory(&self, tax_year_id: &str) -> EngineResult<EmployeeDirectory> {
        let year = self.tax_year(tax_year_id)?;
        let employees = self.config.employees();
        Ok(EmployeeDirectory::for_tax_year(
            employees.employees.iter().cloned(),
            employees.union_fee,
            year,
        ))
    }

    /// Builds a pipeline wired to the reference providers for one tax year.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payslip_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/uk")?;
    /// let pipeline = loader.pipeline_for("2025-26")?;
    /// # Ok::<(), payslip_engine::error::EngineError>(())
    /// ```
    pub fn pipeline_for(&self, tax_year_id: &str) -> EngineResult<ReferencePipeline> {
        PayrollPipeline::new(
            *self.rate_rules(),
            self.tax_provider(),
            self.insurance_provider(tax_year_id)?,
            self.employee_directory(tax_year_id)?,
        )
    }

    /// Computes a payslip with the reference providers for the timesheet's
    /// tax year, and labels it with that year.
    ///
    /// The timesheet is validated before the tax year is resolved, so an
    /// invalid timesheet always fails at the `rate_rules` stage. An unknown
    /// tax year fails at the `deductions` stage, as it does inside the
    /// pipeline.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payslip_engine::config::ConfigLoader;
    /// use payslip_engine::models::TimesheetInput;
    ///
    /// # async fn example(timesheet: TimesheetInput) -> Result<(), Box<dyn std::error::Error>> {
    /// let loader = ConfigLoader::load("./config/uk")?;
    /// let payslip = loader.compute_payslip(&timesheet).await?;
    /// println!("{:?}: {}", payslip.tax_year_label, payslip.net_payment);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn compute_payslip(
        &self,
        timesheet: &TimesheetInput,
    ) -> Result<PayslipResult, PipelineError> {
        timesheet
            .validate()
            .map_err(|e| PipelineError::new(PipelineStage::RateRules, e))?;

        let unresolved = |e| PipelineError::new(PipelineStage::Deductions, e);
        let label = self
            .tax_year(&timesheet.tax_year_id)
            .map_err(unresolved)?
            .label
            .clone();
        let pipeline = self
            .pipeline_for(&timesheet.tax_year_id)
            .map_err(unresolved)?;

        let mut payslip = pipeline.run(timesheet).await?;
        payslip.tax_year_label = Some(label);
        Ok(payslip)
    }
}
