use crate::state::PricingState;
use landed_calc::FeeCalculator;
use landed_core::{EvaluationContext, PricingError, Stage};

#[derive(Default)]
pub struct FeeScheduleStage;

impl Stage<PricingState> for FeeScheduleStage {
    fn id(&self) -> &'static str {
        "fee.schedule.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let terms = FeeCalculator::new(ctx.inputs.fees, ctx.config).terms(ctx.request())?;
        state.fee_terms = Some(terms);
        Ok(state)
    }
}
