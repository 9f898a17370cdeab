//! Per-item outcomes and the batch report
use chrono::{DateTime, Utc};
use landed_core::{Jpy, PolicyMatch, PricingFailure, ScenarioResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why an item has no evaluation, or was evaluated unprofitable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    NoMatchingPolicy,
    NoCategoryFee,
    UnknownHsCode,
    InsufficientProfit,
    CalculationError,
    TimedOut,
    SourceUnavailable,
    Cancelled,
}

impl From<PricingFailure> for FailureReason {
    fn from(failure: PricingFailure) -> Self {
        match failure {
            PricingFailure::NoMatchingPolicy => FailureReason::NoMatchingPolicy,
            PricingFailure::NoCategoryFee => FailureReason::NoCategoryFee,
            PricingFailure::UnknownHsCode => FailureReason::UnknownHsCode,
            PricingFailure::InsufficientProfit => FailureReason::InsufficientProfit,
            PricingFailure::CalculationError => FailureReason::CalculationError,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let code = match self {
            FailureReason::NoMatchingPolicy => "NO_MATCHING_POLICY",
            FailureReason::NoCategoryFee => "NO_CATEGORY_FEE",
            FailureReason::UnknownHsCode => "UNKNOWN_HS_CODE",
            FailureReason::InsufficientProfit => "INSUFFICIENT_PROFIT",
            FailureReason::CalculationError => "CALCULATION_ERROR",
            FailureReason::TimedOut => "TIMED_OUT",
            FailureReason::SourceUnavailable => "SOURCE_UNAVAILABLE",
            FailureReason::Cancelled => "CANCELLED",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Evaluated {
        product_id: String,
        profitable: bool,
        ddp_result: ScenarioResult,
        ddu_result: ScenarioResult,
        policy_used: PolicyMatch,
    },
    Failed {
        product_id: String,
        reason: FailureReason,
        message: String,
    },
}

impl ItemOutcome {
    pub fn failed(product_id: impl Into<String>, reason: FailureReason, message: impl Into<String>) -> Self {
        ItemOutcome::Failed {
            product_id: product_id.into(),
            reason,
            message: message.into(),
        }
    }

    pub fn product_id(&self) -> &str {
        match self {
            ItemOutcome::Evaluated { product_id, .. } | ItemOutcome::Failed { product_id, .. } => product_id,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            ItemOutcome::Failed { reason, .. } => Some(*reason),
            ItemOutcome::Evaluated { profitable: false, .. } => Some(FailureReason::InsufficientProfit),
            ItemOutcome::Evaluated { .. } => None,
        }
    }
}

/// Evaluated but below threshold in at least one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnprofitableRecord {
    pub product_id: String,
    pub reason: FailureReason,
    pub ddp_profit_jpy: Jpy,
    pub ddu_profit_jpy: Jpy,
    pub ddp_margin: f64,
    pub ddu_margin: f64,
}

/// Cumulative counts, reported after every completed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub engine_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    /// Items evaluated, profitable or not
    pub succeeded: usize,
    pub failed: usize,
    pub profitable: usize,
    pub cancelled: bool,
    pub failure_counts: BTreeMap<FailureReason, usize>,
    pub outcomes: BTreeMap<String, ItemOutcome>,
}

impl BatchReport {
    pub(crate) fn build(
        started_at: DateTime<Utc>,
        outcomes: BTreeMap<String, ItemOutcome>,
        cancelled: bool,
    ) -> Self {
        let mut failure_counts = BTreeMap::new();
        for reason in outcomes.values().filter_map(ItemOutcome::failure_reason) {
            *failure_counts.entry(reason).or_insert(0) += 1;
        }
        let failed = outcomes.values().filter(|o| o.is_failed()).count();
        let profitable = outcomes
            .values()
            .filter(|o| matches!(o, ItemOutcome::Evaluated { profitable: true, .. }))
            .count();

        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            engine_version: landed_core::ENGINE_VERSION.to_string(),
            started_at,
            finished_at: Utc::now(),
            total: outcomes.len(),
            succeeded: outcomes.len() - failed,
            failed,
            profitable,
            cancelled,
            failure_counts,
            outcomes,
        }
    }

    pub fn outcome(&self, product_id: &str) -> Option<&ItemOutcome> {
        self.outcomes.get(product_id)
    }

    pub fn unprofitable_records(&self) -> Vec<UnprofitableRecord> {
        self.outcomes
            .values()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Evaluated {
                    product_id,
                    profitable: false,
                    ddp_result,
                    ddu_result,
                    ..
                } => Some(UnprofitableRecord {
                    product_id: product_id.clone(),
                    reason: FailureReason::InsufficientProfit,
                    ddp_profit_jpy: ddp_result.profit_jpy,
                    ddu_profit_jpy: ddu_result.profit_jpy,
                    ddp_margin: ddp_result.margin,
                    ddu_margin: ddu_result.margin,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, reason: FailureReason) -> usize {
        self.failure_counts.get(&reason).copied().unwrap_or(0)
    }
}
