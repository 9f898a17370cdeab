//! Stage Trait: one step of the pricing pipeline
use crate::context::EvaluationContext;
use crate::error::PricingError;

/// A pipeline step over state `S`
pub trait Stage<S>: Send + Sync {
    /// Unique stage id (e.g. "weight.billable.v1")
    fn id(&self) -> &'static str;

    /// Whether identical inputs always give identical output (default: true)
    fn deterministic(&self) -> bool {
        true
    }

    /// Execute the stage. An `Err` ends the pipeline for this product.
    fn run(&self, state: S, ctx: &EvaluationContext<'_>) -> Result<S, PricingError>;
}
