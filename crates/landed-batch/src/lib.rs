//! Landed Batch: evaluate many products with bounded concurrency
//!
//! The engine and catalog are shared behind `Arc`; each product is an
//! independent tokio task. A failure is recorded against its product and
//! never aborts the batch unless `continue_on_error` is off.

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod limiter;
pub mod report;
pub mod runner;
pub mod source;

pub use cancel::CancelHandle;
pub use catalog::{CatalogFile, PricingCatalog};
pub use config::{BatchConfig, RateLimitConfig, MAX_CONCURRENCY};
pub use limiter::CallCounter;
pub use report::{BatchProgress, BatchReport, FailureReason, ItemOutcome, UnprofitableRecord};
pub use runner::BatchRunner;
pub use source::{InMemorySource, ProductSource, SourceError};
