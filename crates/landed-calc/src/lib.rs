//! Landed Calc: the arithmetic behind a landed-cost quote
//!
//! Each calculator is a small, pure struct over borrowed snapshots. The
//! stage pipeline in `landed-stages` wires them together; nothing here
//! knows about pipelines or batches.

pub mod currency;
pub mod duty;
pub mod fees;
pub mod profitability;
pub mod weight;

pub use currency::CurrencyConverter;
pub use duty::DutyCalculator;
pub use fees::{FeeCalculator, FeeTerms, PAYMENT_GATEWAYS};
pub use profitability::{CostBasis, ProfitabilityEvaluator};
pub use weight::{RateMatrix, WeightBandResolver, DEFAULT_ZONE_CODE, ZONE_LOOKUP_ORDER};
