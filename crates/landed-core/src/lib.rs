//! Landed Core: data model, configuration, errors and the stage runner
//!
//! Every type the pricing engine consumes or produces between stages lives
//! here, together with the generic `Stage` contract and the
//! `PipelineRunner` that executes stages in order with hashed traces.

pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod money;
pub mod quote;
pub mod record;
pub mod runner;
pub mod stage;
pub mod tables;

pub use config::{CustomsCharges, EngineConfig, PaymentGateway, StoreDiscounts, TradeAgreement};
pub use context::{EvaluationContext, PricingInputs};
pub use error::{ConfigError, PricingError, PricingFailure};
pub use model::{
    CategoryFeeSchedule, Condition, CountryCode, DutyMode, ExchangeRate, HsCodeRecord,
    MarginSetting, PricingRequest, ShippingPolicy, StoreType, ZoneRate,
};
pub use money::{Jpy, Usd};
pub use quote::{
    BillableWeight, DutyQuote, FeeQuote, PolicyMatch, RateKind, ScenarioResult, ZoneLookup,
};
pub use record::{ProductFacts, RawProductRecord, RecordError};
pub use runner::{PipelineRunner, StageTrace};
pub use stage::Stage;
pub use tables::{FeeScheduleTable, HsCodeTable, HsLookup, MarginTable};

/// Engine version stamped into reports
pub const ENGINE_VERSION: &str = "1.0.0";
