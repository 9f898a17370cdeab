//! Margin rules
//!
//! A rule holds one scenario's figures against one threshold from the
//! margin setting. Rules are plain data so a catalog can list them.

use crate::verdict::Violation;
use landed_core::{MarginSetting, ScenarioResult};
use serde::{Deserialize, Serialize};

/// A single margin rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginRule {
    pub id: String,
    pub name: String,
    pub condition: MarginCondition,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// What a rule checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarginCondition {
    /// `profit_jpy >= min_amount`
    MinProfitJpy,
    /// `margin >= min_margin`
    MinMargin,
}

impl MarginRule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, condition: MarginCondition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// `None` when the scenario meets the threshold (boundary included)
    pub fn evaluate(&self, scenario: &ScenarioResult, setting: &MarginSetting) -> Option<Violation> {
        if !self.enabled {
            return None;
        }

        let (measured, threshold, description) = match self.condition {
            MarginCondition::MinProfitJpy => (
                scenario.profit_jpy.value(),
                setting.min_amount.value(),
                format!(
                    "{} profit {} is below the minimum {}",
                    scenario.mode, scenario.profit_jpy, setting.min_amount
                ),
            ),
            MarginCondition::MinMargin => (
                scenario.margin,
                setting.min_margin,
                format!(
                    "{} margin {:.4} is below the minimum {:.4}",
                    scenario.mode, scenario.margin, setting.min_margin
                ),
            ),
        };

        if measured >= threshold {
            return None;
        }

        Some(
            Violation::new(&self.id, &self.name, description)
                .in_scenario(scenario.mode)
                .with_context(serde_json::json!({
                    "measured": measured,
                    "threshold": threshold,
                })),
        )
    }
}

/// Minimum yen profit and minimum margin
pub fn default_rules() -> Vec<MarginRule> {
    vec![
        MarginRule::new("min_profit_jpy", "Minimum profit", MarginCondition::MinProfitJpy),
        MarginRule::new("min_margin", "Minimum margin", MarginCondition::MinMargin),
    ]
}
