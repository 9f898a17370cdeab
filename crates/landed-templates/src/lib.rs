//! Landed Templates: pick a shipping policy for every cell of a
//! weight × price grid
//!
//! Listing templates are generated ahead of time, one per (weight tier,
//! price tier) cell. For each cell the selector prefers a policy priced
//! close to the tier and with weight headroom above it.

mod grid;
mod selector;

pub use grid::{TemplateGrid, DEFAULT_PRICE_TIERS_USD, DEFAULT_WEIGHT_TIERS_KG};
pub use selector::{TemplateRow, TemplateSelector, DEFAULT_MAX_PRICE_DIFF_PCT};
