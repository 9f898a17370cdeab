//! Policy scoring per grid cell
//!
//! `score = 100 - 2 * price_diff_pct + 0.5 * weight_margin_kg`
//!
//! where `price_diff_pct = |policy price - tier| / tier * 100` and
//! `weight_margin_kg = weight_max_kg - tier weight`. Only policies within
//! the price tolerance compete on score; if none is within it, the policy
//! closest in price is used instead.

use crate::grid::TemplateGrid;
use landed_core::{ShippingPolicy, Usd};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PRICE_DIFF_PCT: f64 = 20.0;

const BASE_SCORE: f64 = 100.0;
const PRICE_DIFF_PENALTY: f64 = 2.0;
const WEIGHT_MARGIN_BONUS: f64 = 0.5;

/// Selected policy for one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    pub weight_kg: f64,
    pub price_tier_usd: Usd,
    pub policy_id: String,
    pub policy_name: String,
    pub policy_price_usd: Usd,
    pub price_diff_pct: f64,
    pub weight_margin_kg: f64,
    pub score: f64,
    /// False when no policy was within tolerance and the closest was taken
    pub within_tolerance: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateSelector {
    max_price_diff_pct: f64,
}

impl Default for TemplateSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PRICE_DIFF_PCT)
    }
}

struct Candidate<'a> {
    policy: &'a ShippingPolicy,
    price_diff_pct: f64,
    weight_margin_kg: f64,
    score: f64,
}

impl TemplateSelector {
    pub fn new(max_price_diff_pct: f64) -> Self {
        Self { max_price_diff_pct }
    }

    /// Best policy for one cell, or `None` when nothing covers the weight.
    /// Ties keep the earlier policy.
    pub fn select(&self, policies: &[ShippingPolicy], weight_kg: f64, tier: Usd) -> Option<TemplateRow> {
        let candidates: Vec<Candidate<'_>> = policies
            .iter()
            .filter(|p| p.covers(weight_kg))
            .map(|policy| {
                let price_diff_pct = (policy.price_usd - tier).value().abs() / tier.value() * 100.0;
                let weight_margin_kg = policy.weight_max_kg - weight_kg;
                Candidate {
                    policy,
                    price_diff_pct,
                    weight_margin_kg,
                    score: BASE_SCORE - PRICE_DIFF_PENALTY * price_diff_pct
                        + WEIGHT_MARGIN_BONUS * weight_margin_kg,
                }
            })
            .collect();

        let qualifying = candidates
            .iter()
            .filter(|c| c.price_diff_pct <= self.max_price_diff_pct)
            .fold(None, |best: Option<&Candidate<'_>>, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            });

        let (chosen, within_tolerance) = match qualifying {
            Some(c) => (c, true),
            None => {
                let closest = candidates.iter().fold(None, |best: Option<&Candidate<'_>>, c| {
                    match best {
                        Some(b) if b.price_diff_pct <= c.price_diff_pct => Some(b),
                        _ => Some(c),
                    }
                })?;
                (closest, false)
            }
        };

        Some(TemplateRow {
            weight_kg,
            price_tier_usd: tier,
            policy_id: chosen.policy.id.clone(),
            policy_name: chosen.policy.name.clone(),
            policy_price_usd: chosen.policy.price_usd,
            price_diff_pct: chosen.price_diff_pct,
            weight_margin_kg: chosen.weight_margin_kg,
            score: chosen.score,
            within_tolerance,
        })
    }

    /// One row per cell that some policy covers
    pub fn build(&self, grid: &TemplateGrid, policies: &[ShippingPolicy]) -> Vec<TemplateRow> {
        let rows: Vec<_> = grid
            .cells()
            .filter_map(|(weight, tier)| self.select(policies, weight, tier))
            .collect();

        let relaxed = rows.iter().filter(|r| !r.within_tolerance).count();
        tracing::debug!(
            cells = grid.len(),
            rows = rows.len(),
            relaxed,
            "template grid built"
        );
        rows
    }
}
