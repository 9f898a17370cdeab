//! PricingEngine: runs the stage pipeline for one product
//!
//! ```text
//! input.validate → weight.billable → policy.select → fee.schedule
//!     → duty.hs → landed.cost (DDP + DDU) → margin.gate
//! ```
//!
//! An engine holds no per-product state and is shared across tasks
//! behind an `Arc`.

use crate::result::PricingResult;
use crate::state::PricingState;
use crate::{
    BillableWeightStage, DutyHsStage, FeeScheduleStage, LandedCostStage, MarginGateStage,
    SelectPolicyStage, ValidateInputStage,
};
use landed_core::{
    EngineConfig, EvaluationContext, PipelineRunner, PricingError, PricingInputs, Stage,
    StageTrace,
};
use landed_policy::MarginGate;

pub struct PricingEngine {
    config: EngineConfig,
    runner: PipelineRunner<PricingState>,
}

/// The seven pricing stages in order
pub fn default_stages(gate: MarginGate) -> Vec<Box<dyn Stage<PricingState>>> {
    vec![
        Box::new(ValidateInputStage),
        Box::new(BillableWeightStage),
        Box::new(SelectPolicyStage),
        Box::new(FeeScheduleStage),
        Box::new(DutyHsStage),
        Box::new(LandedCostStage),
        Box::new(MarginGateStage::new(gate)),
    ]
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PricingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_gate(config, MarginGate::default())
    }

    pub fn with_gate(config: EngineConfig, gate: MarginGate) -> Self {
        Self {
            config,
            runner: PipelineRunner::new(default_stages(gate)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pipeline_id(&self) -> &str {
        self.runner.pipeline_id()
    }

    pub fn evaluate(&self, inputs: PricingInputs<'_>) -> Result<PricingResult, PricingError> {
        self.evaluate_traced(inputs, None).map(|(result, _)| result)
    }

    /// Evaluate and keep the per-stage traces
    pub fn evaluate_traced(
        &self,
        inputs: PricingInputs<'_>,
        product_id: Option<&str>,
    ) -> Result<(PricingResult, Vec<StageTrace>), PricingError> {
        let mut ctx = EvaluationContext::new(inputs, &self.config);
        if let Some(id) = product_id {
            ctx = ctx.with_product(id);
        }
        let product = ctx.product_id.as_deref().unwrap_or("-");

        let outcome = self
            .runner
            .run(PricingState::default(), &ctx)
            .and_then(|(state, traces)| {
                PricingResult::from_state(state, inputs.rate).map(|result| (result, traces))
            });

        match &outcome {
            Ok((result, _)) => tracing::info!(
                trace_id = %ctx.trace_id,
                product,
                profitable = result.success,
                price = %result.selling_price_usd,
                profit_jpy = %result.profit_jpy_no_refund,
                margin = result.profit_margin_no_refund,
                policy = %result.policy_used.policy_id,
                "evaluated"
            ),
            Err(e @ PricingError::CalculationError(_)) => tracing::error!(
                trace_id = %ctx.trace_id,
                product,
                pipeline = self.runner.pipeline_id(),
                request = ?inputs.request,
                error = %e,
                "calculation failed"
            ),
            Err(e) => tracing::info!(
                trace_id = %ctx.trace_id,
                product,
                reason = %e.reason(),
                error = %e,
                "not evaluated"
            ),
        }

        outcome
    }
}
