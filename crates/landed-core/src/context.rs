//! Evaluation Context: read-only inputs shared by every stage of one run
use crate::config::EngineConfig;
use crate::model::{ExchangeRate, MarginSetting, PricingRequest, ShippingPolicy};
use crate::tables::{FeeScheduleTable, HsCodeTable};

/// Snapshots the caller fetched for one product
#[derive(Debug, Clone, Copy)]
pub struct PricingInputs<'a> {
    pub request: &'a PricingRequest,
    /// Candidate policies in the caller's order (order breaks ties)
    pub policies: &'a [ShippingPolicy],
    pub fees: &'a FeeScheduleTable,
    pub margin: &'a MarginSetting,
    pub rate: &'a ExchangeRate,
    pub hs_codes: &'a HsCodeTable,
}

#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    pub inputs: PricingInputs<'a>,
    pub config: &'a EngineConfig,
    /// Correlates log lines of one evaluation; never part of the result
    pub trace_id: String,
    pub product_id: Option<String>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(inputs: PricingInputs<'a>, config: &'a EngineConfig) -> Self {
        Self {
            inputs,
            config,
            trace_id: uuid::Uuid::new_v4().to_string(),
            product_id: None,
        }
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn request(&self) -> &'a PricingRequest {
        self.inputs.request
    }
}
