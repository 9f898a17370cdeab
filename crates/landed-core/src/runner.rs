//! Pipeline Runner: chains stages, stops at the first failure, records traces
use crate::context::EvaluationContext;
use crate::error::PricingError;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// What one stage did to the state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub deterministic: bool,
    pub latency_ms: u64,
}

pub struct PipelineRunner<S> {
    stages: Vec<Box<dyn Stage<S>>>,
    pipeline_id: String,
}

impl<S: Serialize> PipelineRunner<S> {
    pub fn new(stages: Vec<Box<dyn Stage<S>>>) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|s| s.id().split('.').next().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("→");

        Self { stages, pipeline_id }
    }

    pub fn run(
        &self,
        initial: S,
        ctx: &EvaluationContext<'_>,
    ) -> Result<(S, Vec<StageTrace>), PricingError> {
        let mut current = initial;
        let mut traces = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let start = Instant::now();
            let in_hash = self.hash_state(&current)?;

            current = stage.run(current, ctx).map_err(|e| {
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    stage = stage.id(),
                    error = %e,
                    "stage stopped the pipeline"
                );
                e
            })?;

            let out_hash = self.hash_state(&current)?;
            let latency_ms = start.elapsed().as_millis() as u64;
            tracing::debug!(trace_id = %ctx.trace_id, stage = stage.id(), latency_ms, "stage done");

            traces.push(StageTrace {
                id: stage.id().to_string(),
                in_hash,
                out_hash,
                deterministic: stage.deterministic(),
                latency_ms,
            });
        }

        Ok((current, traces))
    }

    fn hash_state(&self, state: &S) -> Result<String, PricingError> {
        let bytes = serde_json::to_vec(state)
            .map_err(|e| PricingError::calculation(format!("state not serializable: {}", e)))?;
        Ok(format!("blake3:{}", blake3::hash(&bytes)))
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
