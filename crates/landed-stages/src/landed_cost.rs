//! Landed cost and profit for both duty regimes
use crate::state::{filled, PricingState};
use landed_calc::{CostBasis, CurrencyConverter, ProfitabilityEvaluator};
use landed_core::{DutyMode, EvaluationContext, PricingError, Stage};

/// Prices the product (the caller's price, or one suggested at the default
/// margin) and computes the DDP and DDU scenarios at that price.
#[derive(Default)]
pub struct LandedCostStage;

impl Stage<PricingState> for LandedCostStage {
    fn id(&self) -> &'static str {
        "landed.cost.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let cost_usd = *filled(&state.cost_usd, "cost", self.id())?;
        let policy = filled(&state.policy, "shipping policy", self.id())?;
        let terms = filled(&state.fee_terms, "fee terms", self.id())?;
        let duty = filled(&state.duty, "duty quote", self.id())?;

        let request = ctx.request();
        let evaluator = ProfitabilityEvaluator::new(CurrencyConverter::new(*ctx.inputs.rate));
        let basis = CostBasis::new(cost_usd, &policy.zone, duty.duty_usd)
            .with_customs(ctx.config.customs_for(&request.destination_country));

        let (price, suggested) = match request.selling_price_usd {
            Some(price) => (price, false),
            None => (
                evaluator.suggest_price(&basis, terms, ctx.inputs.margin.default_margin)?,
                true,
            ),
        };

        let ddp = evaluator.scenario(DutyMode::Ddp, price, &basis, terms, request.refundable_fees_jpy)?;
        let ddu = evaluator.scenario(DutyMode::Ddu, price, &basis, terms, request.refundable_fees_jpy)?;

        state.basis = Some(basis);
        state.selling_price_usd = Some(price);
        state.price_suggested = suggested;
        state.ddp = Some(ddp);
        state.ddu = Some(ddu);
        Ok(state)
    }
}
