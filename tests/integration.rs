//! Integration tests for the Payslip Engine.
//!
//! These tests drive the pipeline against the shipped UK configuration and
//! cover:
//! - Basic rate, higher rate and below-allowance earnings
//! - Overtime
//! - Student loan plans and union fees
//! - K codes and anomalous (negative) net pay
//! - Error cases tagged with the failing stage
//! - Batch runs and the serialized payslip shape

use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;

use payslip_engine::config::{ConfigLoader, ReferencePipeline};
use payslip_engine::error::{EngineError, PipelineStage};
use payslip_engine::models::{PayslipResult, TimesheetInput};

// =============================================================================
// Test Helpers
// =============================================================================

fn loader() -> ConfigLoader {
    ConfigLoader::load("./config/uk").expect("Failed to load config")
}

fn pipeline() -> ReferencePipeline {
    loader()
        .pipeline_for("2025-26")
        .expect("Failed to build pipeline")
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Reads a decimal serialized as a JSON string.
fn decimal_field(value: &Value, field: &str) -> Decimal {
    let raw = value[field]
        .as_str()
        .unwrap_or_else(|| panic!("field '{}' is not a string: {}", field, value[field]));
    decimal(raw)
}

fn create_timesheet(
    employee_id: &str,
    hourly_rate: &str,
    hours_worked: &str,
    contractual_hours: &str,
    tax_code: &str,
) -> TimesheetInput {
    serde_json::from_value(json!({
        "employee_id": employee_id,
        "hourly_rate": hourly_rate,
        "hours_worked": hours_worked,
        "contractual_hours": contractual_hours,
        "tax_code": tax_code,
        "tax_year_id": "2025-26",
        "pay_date": "2025-09-30",
        "pay_month": "September"
    }))
    .expect("Failed to deserialize timesheet")
}

async fn run(timesheet: TimesheetInput) -> PayslipResult {
    pipeline()
        .run(&timesheet)
        .await
        .unwrap_or_else(|e| panic!("Payroll run failed: {}", e))
}

// =============================================================================
// Basic Rate Earnings
// =============================================================================

#[tokio::test]
async fn test_basic_rate_with_plan2_loan_and_union_fee() {
    // 160 hours at 18.75 = 3000
    let payslip = run(create_timesheet("emp_001", "18.75", "160", "160", "1257L")).await;

    assert_eq!(payslip.total_earnings, decimal("3000"));
    // (3000 - 1047.50) x 20%
    assert_eq!(payslip.deductions.tax, decimal("390.50"));
    // (3000 - 1047.50) x 8%
    assert_eq!(payslip.deductions.national_insurance, decimal("156.20"));
    // (3000 - 2372.50) x 9% = 56.475, rounded down
    assert_eq!(payslip.deductions.student_loan, decimal("56"));
    assert_eq!(payslip.deductions.union_fee, decimal("10"));
    assert_eq!(payslip.deductions.total_deduction, decimal("612.70"));
    assert_eq!(payslip.net_payment, decimal("2387.30"));
    assert!(!payslip.anomalous);
}

#[tokio::test]
async fn test_postgraduate_loan_without_union_fee() {
    let payslip = run(create_timesheet("emp_004", "18.75", "160", "160", "1257L")).await;

    // (3000 - 1750) x 6%
    assert_eq!(payslip.deductions.student_loan, decimal("75"));
    assert_eq!(payslip.deductions.union_fee, Decimal::ZERO);
    assert_eq!(payslip.deductions.total_deduction, decimal("621.70"));
    assert_eq!(payslip.net_payment, decimal("2378.30"));
}

#[tokio::test]
async fn test_employee_profile_copied_onto_payslip() {
    let payslip = run(create_timesheet("emp_001", "18.75", "160", "160", "1257L")).await;

    assert_eq!(payslip.full_name, "Ada Lovelace");
    assert_eq!(payslip.ni_number, "QQ123456C");
}

#[tokio::test]
async fn test_scottish_prefix_uses_same_allowance() {
    let payslip = run(create_timesheet("emp_002", "18.75", "160", "160", "S1257L")).await;

    assert_eq!(payslip.deductions.tax, decimal("390.50"));
}

// =============================================================================
// Higher Rate Earnings
// =============================================================================

#[tokio::test]
async fn test_higher_rate_earnings() {
    // 200 hours at 25 = 5000
    let payslip = run(create_timesheet("emp_003", "25", "200", "200", "1257L")).await;

    assert_eq!(payslip.total_earnings, decimal("5000"));
    // 3141.67 at 20% plus 810.83 at 40%
    assert_eq!(payslip.deductions.tax, decimal("952.67"));
    // 3141.67 at 8% plus 810.83 at 2%
    assert_eq!(payslip.deductions.national_insurance, decimal("267.55"));
    assert_eq!(payslip.deductions.union_fee, decimal("10"));
    assert_eq!(payslip.deductions.total_deduction, decimal("1230.22"));
    assert_eq!(payslip.net_payment, decimal("3769.78"));
}

// =============================================================================
// Overtime
// =============================================================================

#[tokio::test]
async fn test_overtime_below_personal_allowance() {
    let payslip = run(create_timesheet("emp_002", "20", "45", "40", "1257L")).await;

    assert_eq!(payslip.rates.overtime_hours, decimal("5"));
    assert_eq!(payslip.rates.overtime_rate, decimal("30"));
    assert_eq!(payslip.rates.contractual_earnings, decimal("800"));
    assert_eq!(payslip.rates.overtime_earnings, decimal("150"));
    assert_eq!(payslip.total_earnings, decimal("950"));
    // Below both the allowance and the NI primary threshold
    assert_eq!(payslip.deductions.tax, Decimal::ZERO);
    assert_eq!(payslip.deductions.national_insurance, Decimal::ZERO);
    assert_eq!(payslip.net_payment, decimal("950"));
}

#[tokio::test]
async fn test_short_hours_pay_only_hours_worked() {
    let payslip = run(create_timesheet("emp_002", "15", "30", "40", "1257L")).await;

    assert_eq!(payslip.rates.overtime_hours, Decimal::ZERO);
    assert_eq!(payslip.rates.overtime_earnings, Decimal::ZERO);
    assert_eq!(payslip.total_earnings, decimal("450"));
}

// =============================================================================
// Anomalous Net Pay
// =============================================================================

#[tokio::test]
async fn test_k_code_on_tiny_earnings_flags_negative_net_pay() {
    // 1 hour at 10: K-code tax is capped at 5, plus the 10 union fee
    let payslip = run(create_timesheet("emp_003", "10", "1", "1", "K5000")).await;

    assert_eq!(payslip.total_earnings, decimal("10"));
    assert_eq!(payslip.deductions.tax, decimal("5"));
    assert_eq!(payslip.deductions.total_deduction, decimal("15"));
    assert_eq!(payslip.net_payment, decimal("-5"));
    assert!(payslip.anomalous);
    assert_eq!(payslip.audit_trace.warnings[0].code, "NEGATIVE_NET_PAY");
    assert_eq!(payslip.audit_trace.warnings[0].severity, "high");
}

#[tokio::test]
async fn test_no_tax_code() {
    let payslip = run(create_timesheet("emp_002", "18.75", "160", "160", "NT")).await;

    assert_eq!(payslip.deductions.tax, Decimal::ZERO);
    assert_eq!(payslip.deductions.national_insurance, decimal("156.20"));
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_unknown_employee_fails_at_deductions() {
    let err = pipeline()
        .run(&create_timesheet("ghost", "20", "40", "40", "1257L"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, PipelineStage::Deductions);
    match err.kind() {
        EngineError::NotFound { entity, key } => {
            assert_eq!(entity, "employee");
            assert_eq!(key, "ghost");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_tax_code_fails_at_deductions() {
    let err = pipeline()
        .run(&create_timesheet("emp_001", "20", "40", "40", "XYZ"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, PipelineStage::Deductions);
    assert!(matches!(err.kind(), EngineError::NotFound { .. }));
}

#[tokio::test]
async fn test_unknown_tax_year_in_timesheet() {
    let mut timesheet = create_timesheet("emp_001", "20", "40", "40", "1257L");
    timesheet.tax_year_id = "2030-31".to_string();

    let err = pipeline().run(&timesheet).await.unwrap_err();
    assert_eq!(err.stage, PipelineStage::Deductions);
    assert!(err.to_string().contains("2030-31"));
}

#[tokio::test]
async fn test_zero_hourly_rate_fails_before_providers() {
    let err = pipeline()
        .run(&create_timesheet("ghost", "0", "40", "40", "1257L"))
        .await
        .unwrap_err();

    // Validation fails before the unknown employee is ever looked up
    assert_eq!(err.stage, PipelineStage::RateRules);
    assert!(matches!(err.kind(), EngineError::InvalidInput { .. }));
}

#[test]
fn test_malformed_timesheet_is_rejected() {
    let result: Result<TimesheetInput, _> = serde_json::from_value(json!({
        "employee_id": "emp_001",
        "hourly_rate": "twenty"
    }));
    assert!(result.is_err());
}

// =============================================================================
// Batch Runs
// =============================================================================

#[tokio::test]
async fn test_batch_run_keeps_input_order() {
    let timesheets = vec![
        create_timesheet("emp_001", "18.75", "160", "160", "1257L"),
        create_timesheet("ghost", "18.75", "160", "160", "1257L"),
        create_timesheet("emp_002", "20", "45", "40", "1257L"),
    ];

    let results = pipeline().run_batch(&timesheets).await;

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().unwrap().net_payment,
        decimal("2387.30")
    );
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().net_payment, decimal("950"));
}

// =============================================================================
// Serialized Payslip
// =============================================================================

#[tokio::test]
async fn test_payslip_json_is_flat() {
    let payslip = run(create_timesheet("emp_001", "18.75", "160", "160", "1257L")).await;
    let json = serde_json::to_value(&payslip).unwrap();

    assert_eq!(json["employee_id"], "emp_001");
    assert_eq!(json["tax_code"], "1257L");
    assert_eq!(json["pay_date"], "2025-09-30");
    assert_eq!(json["full_name"], "Ada Lovelace");
    assert_eq!(decimal_field(&json, "total_earnings"), decimal("3000"));
    assert_eq!(decimal_field(&json, "total_deduction"), decimal("612.70"));
    assert_eq!(decimal_field(&json, "net_payment"), decimal("2387.30"));
    assert_eq!(json["anomalous"], false);
    assert_eq!(json["audit_trace"]["steps"].as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() {
    let pipeline = pipeline();
    let timesheet = create_timesheet("emp_003", "25", "200", "200", "1257L");

    let first = serde_json::to_string(&pipeline.run(&timesheet).await.unwrap()).unwrap();
    let second = serde_json::to_string(&pipeline.run(&timesheet).await.unwrap()).unwrap();

    assert_eq!(first, second);
}
