//! Landed Stages: the pricing pipeline
//!
//! One stage per step of a landed-cost quote, each a
//! `landed_core::Stage<PricingState>`. `PricingEngine` chains them with
//! the core `PipelineRunner`.

mod billable_weight;
mod duty_hs;
mod engine;
mod fee_schedule;
mod landed_cost;
mod margin_gate;
mod result;
mod select_policy;
mod state;
mod validate_input;

pub use billable_weight::BillableWeightStage;
pub use duty_hs::DutyHsStage;
pub use engine::{default_stages, PricingEngine};
pub use fee_schedule::FeeScheduleStage;
pub use landed_cost::LandedCostStage;
pub use margin_gate::MarginGateStage;
pub use result::{CostBreakdown, PricingResult};
pub use select_policy::SelectPolicyStage;
pub use state::PricingState;
pub use validate_input::ValidateInputStage;
