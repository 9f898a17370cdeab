//! Margin gate: both duty regimes must clear every rule
//!
//! A product is only listed if it stays profitable whichever way the buyer
//! ends up importing it, so the DDP and DDU verdicts are combined with AND.

use crate::rule::{default_rules, MarginRule};
use crate::verdict::Verdict;
use landed_core::{MarginSetting, ScenarioResult};
use serde::{Deserialize, Serialize};

/// Verdicts for both scenarios and their combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginEvaluation {
    pub ddp: Verdict,
    pub ddu: Verdict,
    pub final_verdict: Verdict,
}

impl MarginEvaluation {
    pub fn is_profitable(&self) -> bool {
        self.final_verdict.is_allowed()
    }

    pub fn summary(&self) -> String {
        format!("DDP {} | DDU {}", self.ddp, self.ddu)
    }
}

#[derive(Debug, Clone)]
pub struct MarginGate {
    rules: Vec<MarginRule>,
}

impl Default for MarginGate {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl MarginGate {
    pub fn new(rules: Vec<MarginRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MarginRule] {
        &self.rules
    }

    /// Verdict for one scenario
    pub fn check(&self, scenario: &ScenarioResult, setting: &MarginSetting) -> Verdict {
        let violations: Vec<_> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(scenario, setting))
            .collect();

        if violations.is_empty() {
            Verdict::allow()
        } else {
            let reason = format!("{} below threshold", scenario.mode);
            Verdict::block(reason, violations)
        }
    }

    pub fn evaluate(
        &self,
        ddp: &ScenarioResult,
        ddu: &ScenarioResult,
        setting: &MarginSetting,
    ) -> MarginEvaluation {
        let ddp_verdict = self.check(ddp, setting);
        let ddu_verdict = self.check(ddu, setting);
        let final_verdict = ddp_verdict.clone().combine(ddu_verdict.clone());

        tracing::trace!(ddp = %ddp_verdict, ddu = %ddu_verdict, "margin gate");

        MarginEvaluation {
            ddp: ddp_verdict,
            ddu: ddu_verdict,
            final_verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::{Condition, DutyMode, Jpy, Usd};

    fn scenario(mode: DutyMode, profit_jpy: f64, margin: f64) -> ScenarioResult {
        ScenarioResult {
            mode,
            selling_price_usd: Usd(100.0),
            cost_usd: Usd::ZERO,
            shipping_cost_usd: Usd::ZERO,
            handling_fee_usd: Usd::ZERO,
            marketplace_fee_usd: Usd::ZERO,
            payment_fee_usd: Usd::ZERO,
            duty_usd: Usd::ZERO,
            customs_fees_usd: Usd::ZERO,
            landed_cost_usd: Usd::ZERO,
            profit_usd: Usd(profit_jpy / 150.0),
            margin,
            profit_jpy: Jpy(profit_jpy),
            profit_jpy_with_refund: Jpy(profit_jpy),
        }
    }

    fn setting() -> MarginSetting {
        MarginSetting {
            country_code: "US".into(),
            condition: Condition::New,
            default_margin: 0.15,
            min_margin: 0.10,
            min_amount: Jpy(3000.0),
        }
    }

    #[test]
    fn test_both_pass() {
        let eval = MarginGate::default().evaluate(
            &scenario(DutyMode::Ddp, 4000.0, 0.12),
            &scenario(DutyMode::Ddu, 4500.0, 0.14),
            &setting(),
        );
        assert!(eval.is_profitable());
    }

    #[test]
    fn test_one_scenario_failing_blocks() {
        // DDU comfortably passes, DDP misses on margin only
        let eval = MarginGate::default().evaluate(
            &scenario(DutyMode::Ddp, 3500.0, 0.08),
            &scenario(DutyMode::Ddu, 9000.0, 0.30),
            &setting(),
        );
        assert!(!eval.is_profitable());
        assert!(eval.ddu.is_allowed());
        let violations = eval.final_verdict.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "min_margin");
        assert_eq!(violations[0].scenario, Some(DutyMode::Ddp));
    }

    #[test]
    fn test_both_failing_collects_all() {
        let eval = MarginGate::default().evaluate(
            &scenario(DutyMode::Ddp, 100.0, 0.01),
            &scenario(DutyMode::Ddu, 200.0, 0.02),
            &setting(),
        );
        assert_eq!(eval.final_verdict.violations().len(), 4);
        assert!(eval.summary().contains("DDP BLOCK"));
    }
}
