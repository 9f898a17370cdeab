//! Verdict types for margin evaluation
//!
//! Provides Allow/Block verdicts with the violations that caused a block.

use landed_core::DutyMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of a margin evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Thresholds met
    Allow,

    /// At least one threshold missed
    Block {
        reason: String,
        violations: Vec<Violation>,
    },
}

impl Verdict {
    pub fn allow() -> Self {
        Verdict::Allow
    }

    pub fn block(reason: impl Into<String>, violations: Vec<Violation>) -> Self {
        Verdict::Block {
            reason: reason.into(),
            violations,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Block { .. })
    }

    /// Both must allow; blocks merge their violations
    pub fn combine(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::Allow, Verdict::Allow) => Verdict::allow(),
            (block @ Verdict::Block { .. }, Verdict::Allow)
            | (Verdict::Allow, block @ Verdict::Block { .. }) => block,
            (
                Verdict::Block {
                    reason: first,
                    violations: mut merged,
                },
                Verdict::Block {
                    reason: second,
                    violations,
                },
            ) => {
                merged.extend(violations);
                Verdict::Block {
                    reason: format!("{}; {}", first, second),
                    violations: merged,
                }
            }
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Verdict::Block { violations, .. } => violations,
            _ => &[],
        }
    }
}

/// A specific threshold miss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    pub description: String,
    /// Scenario that missed the threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<DutyMode>,
    /// Measured figure and the threshold it was held to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl Violation {
    pub fn new(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            description: description.into(),
            scenario: None,
            context: None,
        }
    }

    pub fn in_scenario(mut self, mode: DutyMode) -> Self {
        self.scenario = Some(mode);
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verdict::Allow => write!(f, "ALLOW"),
            Verdict::Block { reason, violations } => {
                write!(f, "BLOCK: {}", reason)?;
                if !violations.is_empty() {
                    write!(f, " ({} violations)", violations.len())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_requires_both() {
        let allow = Verdict::allow();
        let block = Verdict::block("DDU margin", vec![Violation::new("r1", "Rule 1", "low")]);

        assert!(allow.clone().combine(allow.clone()).is_allowed());
        assert!(allow.clone().combine(block.clone()).is_blocked());
        assert!(block.clone().combine(allow).is_blocked());

        let both = block.clone().combine(block);
        assert_eq!(both.violations().len(), 2);
    }

    #[test]
    fn test_violation_builder() {
        let violation = Violation::new("min_margin", "Minimum margin", "too thin")
            .in_scenario(DutyMode::Ddp)
            .with_context(serde_json::json!({ "margin": 0.05 }));
        assert_eq!(violation.scenario, Some(DutyMode::Ddp));
        assert!(violation.context.is_some());
    }

    #[test]
    fn test_verdict_display_and_serialization() {
        assert_eq!(Verdict::allow().to_string(), "ALLOW");
        assert_eq!(serde_json::to_string(&Verdict::allow()).unwrap(), r#"{"type":"ALLOW"}"#);

        let verdict = Verdict::block("profit below minimum", vec![Violation::new("r", "R", "d")]);
        assert_eq!(verdict.to_string(), "BLOCK: profit below minimum (1 violations)");

        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"type\":\"BLOCK\""));
        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_blocked());
    }
}
