use crate::state::PricingState;
use landed_calc::CurrencyConverter;
use landed_core::{EvaluationContext, PricingError, Stage};

/// Rejects malformed inputs and fixes the cost in dollars at the safe rate
#[derive(Default)]
pub struct ValidateInputStage;

impl Stage<PricingState> for ValidateInputStage {
    fn id(&self) -> &'static str {
        "input.validate.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let inputs = &ctx.inputs;
        inputs.request.validate()?;
        inputs.rate.validate()?;
        inputs.margin.validate()?;

        let fx = CurrencyConverter::new(*inputs.rate);
        state.cost_usd = Some(fx.jpy_to_usd_safe(inputs.request.cost_jpy));
        Ok(state)
    }
}
