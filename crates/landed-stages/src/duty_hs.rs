use crate::state::{filled, PricingState};
use landed_calc::DutyCalculator;
use landed_core::{EvaluationContext, PricingError, Stage};

/// Quotes duty for every product; only the DDP scenario pays it
#[derive(Default)]
pub struct DutyHsStage;

impl Stage<PricingState> for DutyHsStage {
    fn id(&self) -> &'static str {
        "duty.hs.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let cost_usd = *filled(&state.cost_usd, "cost", self.id())?;
        let policy = filled(&state.policy, "shipping policy", self.id())?;

        let quote = DutyCalculator::new(ctx.inputs.hs_codes, ctx.config).quote(
            ctx.request(),
            cost_usd,
            policy.zone.actual_cost_usd,
        )?;
        state.duty = Some(quote);
        Ok(state)
    }
}
