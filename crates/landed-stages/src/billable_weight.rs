use crate::state::PricingState;
use landed_calc::WeightBandResolver;
use landed_core::{EvaluationContext, PricingError, Stage};

#[derive(Default)]
pub struct BillableWeightStage;

impl Stage<PricingState> for BillableWeightStage {
    fn id(&self) -> &'static str {
        "weight.billable.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let weight = WeightBandResolver::from_config(ctx.config).for_request(ctx.request());
        if weight.is_volumetric() {
            tracing::debug!(
                trace_id = %ctx.trace_id,
                actual_kg = weight.actual_kg,
                volumetric_kg = weight.volumetric_kg,
                "billing on volumetric weight"
            );
        }
        state.billable = Some(weight);
        Ok(state)
    }
}
