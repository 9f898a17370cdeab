//! State threaded through the pricing stages
//!
//! Each stage fills in its own slot. A stage that finds an earlier slot
//! empty was wired out of order, which is reported as a calculation error
//! rather than a panic.

use landed_calc::{CostBasis, FeeTerms};
use landed_core::{BillableWeight, DutyQuote, PolicyMatch, PricingError, ScenarioResult, Usd};
use landed_policy::MarginEvaluation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingState {
    /// Product cost at the safe rate
    pub cost_usd: Option<Usd>,
    pub billable: Option<BillableWeight>,
    pub policy: Option<PolicyMatch>,
    pub fee_terms: Option<FeeTerms>,
    pub duty: Option<DutyQuote>,
    pub basis: Option<CostBasis>,
    pub selling_price_usd: Option<Usd>,
    pub price_suggested: bool,
    pub ddp: Option<ScenarioResult>,
    pub ddu: Option<ScenarioResult>,
    pub margin: Option<MarginEvaluation>,
}

/// Borrow a slot an earlier stage should have filled
pub(crate) fn filled<'s, T>(
    slot: &'s Option<T>,
    slot_name: &str,
    stage_id: &str,
) -> Result<&'s T, PricingError> {
    slot.as_ref().ok_or_else(|| {
        PricingError::calculation(format!("{} reached with no {} in state", stage_id, slot_name))
    })
}
