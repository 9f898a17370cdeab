//! Intermediate figures produced by the calculators and carried into the
//! final cost breakdown.

use crate::model::{DutyMode, ZoneRate};
use crate::money::{Jpy, Usd};
use crate::tables::HsLookup;
use serde::{Deserialize, Serialize};

/// Carrier-billable weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillableWeight {
    pub actual_kg: f64,
    pub volumetric_kg: f64,
    pub billable_kg: f64,
}

impl BillableWeight {
    pub fn is_volumetric(&self) -> bool {
        self.volumetric_kg > self.actual_kg
    }
}

/// How the destination zone was found on a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneLookup {
    ExactCountry,
    ConfiguredZone,
    Wildcard,
}

/// Policy and zone row selected for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyMatch {
    pub policy_id: String,
    pub policy_name: String,
    pub weight_min_kg: f64,
    pub weight_max_kg: f64,
    pub zone: ZoneRate,
    pub zone_lookup: ZoneLookup,
}

/// Marketplace and payment fees at a given selling price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// FVF rate after store discount
    pub fvf_rate: f64,
    pub final_value_fee: Usd,
    /// Whether the cap replaced the percentage fee
    pub capped: bool,
    pub insertion_fee: Usd,
    pub payment_fee: Usd,
}

impl FeeQuote {
    /// Final value fee plus insertion fee
    pub fn marketplace_fee(&self) -> Usd {
        self.final_value_fee + self.insertion_fee
    }

    pub fn total(&self) -> Usd {
        self.marketplace_fee() + self.payment_fee
    }
}

/// Which tariff column applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    General,
    Special,
}

/// Duty owed on the dutiable value (cost plus freight)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyQuote {
    pub hs_code: String,
    pub lookup: HsLookup,
    pub rate_kind: RateKind,
    pub base_rate: f64,
    pub additional_rate: f64,
    /// Tariff on goods from the origin country, stacked on the HS rate
    pub origin_surcharge_rate: f64,
    pub applicable_rate: f64,
    pub dutiable_value_usd: Usd,
    pub duty_usd: Usd,
}

/// Profit figures for one duty regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub mode: DutyMode,
    pub selling_price_usd: Usd,
    pub cost_usd: Usd,
    pub shipping_cost_usd: Usd,
    pub handling_fee_usd: Usd,
    pub marketplace_fee_usd: Usd,
    pub payment_fee_usd: Usd,
    /// Zero under DDU
    pub duty_usd: Usd,
    /// Processing fee plus brokerage; zero under DDU
    pub customs_fees_usd: Usd,
    pub landed_cost_usd: Usd,
    pub profit_usd: Usd,
    pub margin: f64,
    /// Profit at the spot rate
    pub profit_jpy: Jpy,
    pub profit_jpy_with_refund: Jpy,
}
