use crate::state::{filled, PricingState};
use landed_core::{EvaluationContext, PricingError, Stage};
use landed_policy::MarginGate;

/// Holds both scenarios to the destination's margin setting
#[derive(Default)]
pub struct MarginGateStage {
    gate: MarginGate,
}

impl MarginGateStage {
    pub fn new(gate: MarginGate) -> Self {
        Self { gate }
    }
}

impl Stage<PricingState> for MarginGateStage {
    fn id(&self) -> &'static str {
        "margin.gate.v1"
    }

    fn run(&self, mut state: PricingState, ctx: &EvaluationContext<'_>) -> Result<PricingState, PricingError> {
        let ddp = filled(&state.ddp, "DDP scenario", self.id())?;
        let ddu = filled(&state.ddu, "DDU scenario", self.id())?;
        let evaluation = self.gate.evaluate(ddp, ddu, ctx.inputs.margin);
        state.margin = Some(evaluation);
        Ok(state)
    }
}
