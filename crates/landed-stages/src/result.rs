//! Engine output
//!
//! Nothing here depends on wall-clock time or trace ids, so two
//! evaluations of the same inputs serialize to identical bytes.

use crate::state::{filled, PricingState};
use landed_calc::FeeTerms;
use landed_core::{
    BillableWeight, DutyQuote, ExchangeRate, Jpy, PolicyMatch, PricingError, PricingFailure,
    ScenarioResult, Usd, ENGINE_VERSION,
};
use landed_policy::{Verdict, Violation};
use serde::{Deserialize, Serialize};

/// Where the money goes, per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub cost_usd: Usd,
    pub shipping_cost_usd: Usd,
    pub handling_fee_ddp_usd: Usd,
    pub handling_fee_ddu_usd: Usd,
    pub fee_category: String,
    pub fvf_rate: f64,
    pub marketplace_fee_usd: Usd,
    pub payment_fee_usd: Usd,
    /// Quoted even when the buyer pays it (DDU)
    pub duty_usd: Usd,
    /// Processing fee plus brokerage the seller pays under DDP
    pub customs_fees_ddp_usd: Usd,
    pub exchange_spot: f64,
    pub exchange_safe: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Both scenarios cleared the margin rules
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<PricingFailure>,
    pub selling_price_usd: Usd,
    /// The price was solved for rather than supplied
    pub price_suggested: bool,
    /// Figures from the less profitable scenario
    pub profit_usd: Usd,
    pub profit_margin_no_refund: f64,
    pub profit_jpy_no_refund: Jpy,
    /// Yen profit once refundable fees (consumption tax) come back
    pub profit_jpy_with_refund: Jpy,
    pub billable_weight: BillableWeight,
    pub policy_used: PolicyMatch,
    pub duty: DutyQuote,
    pub breakdown: CostBreakdown,
    pub ddp_result: ScenarioResult,
    pub ddu_result: ScenarioResult,
    pub verdict: Verdict,
    pub engine_version: String,
}

impl PricingResult {
    /// Lower profit wins; DDP on a tie
    pub fn binding_scenario(&self) -> &ScenarioResult {
        binding_of(&self.ddp_result, &self.ddu_result)
    }

    /// Rules broken in either scenario; empty when profitable
    pub fn violations(&self) -> &[Violation] {
        self.verdict.violations()
    }

    pub(crate) fn from_state(state: PricingState, rate: &ExchangeRate) -> Result<Self, PricingError> {
        const AT: &str = "result";
        let terms: &FeeTerms = filled(&state.fee_terms, "fee terms", AT)?;
        let basis = filled(&state.basis, "cost basis", AT)?;
        let ddp = filled(&state.ddp, "DDP scenario", AT)?.clone();
        let ddu = filled(&state.ddu, "DDU scenario", AT)?.clone();
        let verdict = filled(&state.margin, "margin evaluation", AT)?.final_verdict.clone();

        let cost_breakdown = CostBreakdown {
            cost_usd: basis.cost_usd,
            shipping_cost_usd: basis.shipping_cost_usd,
            handling_fee_ddp_usd: basis.handling_ddp_usd,
            handling_fee_ddu_usd: basis.handling_ddu_usd,
            fee_category: terms.category.clone(),
            fvf_rate: terms.fvf_rate,
            marketplace_fee_usd: ddp.marketplace_fee_usd,
            payment_fee_usd: ddp.payment_fee_usd,
            duty_usd: basis.duty_usd,
            customs_fees_ddp_usd: ddp.customs_fees_usd,
            exchange_spot: rate.spot,
            exchange_safe: rate.safe(),
        };

        let binding = binding_of(&ddp, &ddu);
        let profit_usd = binding.profit_usd;
        let profit_margin_no_refund = binding.margin;
        let profit_jpy_no_refund = binding.profit_jpy;
        let profit_jpy_with_refund = binding.profit_jpy_with_refund;

        let success = verdict.is_allowed();
        Ok(Self {
            success,
            failure_reason: (!success).then_some(PricingFailure::InsufficientProfit),
            selling_price_usd: ddp.selling_price_usd,
            price_suggested: state.price_suggested,
            profit_usd,
            profit_margin_no_refund,
            profit_jpy_no_refund,
            profit_jpy_with_refund,
            billable_weight: *filled(&state.billable, "billable weight", AT)?,
            policy_used: filled(&state.policy, "shipping policy", AT)?.clone(),
            duty: filled(&state.duty, "duty quote", AT)?.clone(),
            breakdown: cost_breakdown,
            ddp_result: ddp,
            ddu_result: ddu,
            verdict,
            engine_version: ENGINE_VERSION.to_string(),
        })
    }
}

fn binding_of<'a>(ddp: &'a ScenarioResult, ddu: &'a ScenarioResult) -> &'a ScenarioResult {
    if ddu.profit_usd < ddp.profit_usd {
        ddu
    } else {
        ddp
    }
}
