//! Net pay calculation.
//!
//! Net pay is total earnings minus total deduction. When deductions exceed
//! earnings the negative figure is kept and the result is flagged as
//! anomalous, so misconfigured tax or insurance tables surface to the
//! caller instead of disappearing behind a zero.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, AuditWarning};

use super::guard::in_range;

/// Warning code attached to payslips whose deductions exceed earnings.
pub const NEGATIVE_NET_PAY_WARNING: &str = "NEGATIVE_NET_PAY";

/// The result of the net pay calculation.
#[derive(Debug, Clone)]
pub struct NetPayResult {
    /// Total earnings minus total deduction.
    pub net_payment: Decimal,
    /// True when the net payment is negative.
    pub anomalous: bool,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
    /// Warning raised for an anomalous result.
    pub warning: Option<AuditWarning>,
}

/// Calculates net pay.
///
/// Never clamps: a negative net payment is returned as-is with
/// `anomalous` set.
///
/// # Errors
///
/// Returns `InvalidInput` if the difference overflows.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_net_pay;
/// use rust_decimal::Decimal;
///
/// let paid = calculate_net_pay(Decimal::new(950, 0), Decimal::new(210, 0), 1).unwrap();
/// assert_eq!(paid.net_payment, Decimal::new(740, 0));
/// assert!(!paid.anomalous);
///
/// let short = calculate_net_pay(Decimal::new(200, 0), Decimal::new(250, 0), 1).unwrap();
/// assert_eq!(short.net_payment, Decimal::new(-50, 0));
/// assert!(short.anomalous);
/// ```
pub fn calculate_net_pay(
    total_earnings: Decimal,
    total_deduction: Decimal,
    step_number: u32,
) -> EngineResult<NetPayResult> {
    let net_payment = in_range("net_payment", total_earnings.checked_sub(total_deduction))?;
    let anomalous = net_payment < Decimal::ZERO;

    let (reasoning, warning) = if anomalous {
        let shortfall = -net_payment;
        (
            format!(
                "${} deductions exceed ${} earnings by ${}; negative net pay kept and flagged",
                total_deduction.normalize(),
                total_earnings.normalize(),
                shortfall.normalize()
            ),
            Some(AuditWarning {
                code: NEGATIVE_NET_PAY_WARNING.to_string(),
                message: format!(
                    "Deductions exceed earnings by ${}; check tax and insurance tables",
                    shortfall.normalize()
                ),
                severity: "high".to_string(),
            }),
        )
    } else {
        (
            format!(
                "${} earnings - ${} deductions = ${}",
                total_earnings.normalize(),
                total_deduction.normalize(),
                net_payment.normalize()
            ),
            None,
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "total_earnings": total_earnings.normalize().to_string(),
            "total_deduction": total_deduction.normalize().to_string()
        }),
        output: serde_json::json!({
            "net_payment": net_payment.normalize().to_string(),
            "anomalous": anomalous
        }),
        reasoning,
    };

    Ok(NetPayResult {
        net_payment,
        anomalous,
        audit_step,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Scenario C: 950 earnings, 210 deductions
    #[test]
    fn test_scenario_c_positive_net_pay() {
        let result = calculate_net_pay(dec("950"), dec("210"), 1).unwrap();

        assert_eq!(result.net_payment, dec("740"));
        assert!(!result.anomalous);
        assert!(result.warning.is_none());
        assert_eq!(result.audit_step.output["anomalous"], false);
    }

    /// Scenario D: 200 earnings, 250 deductions
    #[test]
    fn test_scenario_d_negative_net_pay_is_flagged_not_clamped() {
        let result = calculate_net_pay(dec("200"), dec("250"), 1).unwrap();

        assert_eq!(result.net_payment, dec("-50"));
        assert!(result.anomalous);
        let warning = result.warning.unwrap();
        assert_eq!(warning.code, NEGATIVE_NET_PAY_WARNING);
        assert_eq!(warning.severity, "high");
        assert!(warning.message.contains("$50"));
        assert_eq!(
            result.audit_step.output["net_payment"].as_str().unwrap(),
            "-50"
        );
    }

    #[test]
    fn test_exactly_zero_is_not_anomalous() {
        let result = calculate_net_pay(dec("250"), dec("250"), 1).unwrap();
        assert_eq!(result.net_payment, Decimal::ZERO);
        assert!(!result.anomalous);
    }

    #[test]
    fn test_step_number_passed_through() {
        let result = calculate_net_pay(dec("1"), dec("0"), 12).unwrap();
        assert_eq!(result.audit_step.step_number, 12);
    }

    #[test]
    fn test_overflowing_difference_rejected() {
        assert!(calculate_net_pay(Decimal::MIN, Decimal::ONE, 1).is_err());
    }

    proptest! {
        #[test]
        fn prop_net_pay_is_exact_difference(
            earnings in 0i64..100_000_000,
            deduction in 0i64..100_000_000,
        ) {
            let earnings = Decimal::new(earnings, 2);
            let deduction = Decimal::new(deduction, 2);
            let result = calculate_net_pay(earnings, deduction, 1).unwrap();

            prop_assert_eq!(result.net_payment, earnings - deduction);
            prop_assert_eq!(result.anomalous, deduction > earnings);
            prop_assert_eq!(result.warning.is_some(), deduction > earnings);
        }
    }
}
