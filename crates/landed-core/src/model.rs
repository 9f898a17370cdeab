//! Data Model: product facts, shipping policies, fee schedules, margins, rates
//!
//! Every record here is a read-only snapshot fetched by the caller. Each
//! type carries a `validate` method so malformed records are rejected once,
//! before they reach any calculation.

use crate::error::PricingError;
use crate::money::{Jpy, Usd};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 3166-1 alpha-2 country code, stored upper-cased
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two ASCII letters
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 2 && self.0.chars().all(|c| c.is_ascii_alphabetic())
    }
}

impl From<String> for CountryCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CountryCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marketplace store subscription, which discounts the final value fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    None,
    Basic,
    Premium,
}

/// Item condition, part of the margin-setting key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    New,
    Used,
}

/// Who bears import duty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DutyMode {
    /// Delivered Duty Paid: the seller prepays duty
    Ddp,
    /// Delivered Duty Unpaid: the buyer pays on arrival
    Ddu,
}

impl fmt::Display for DutyMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DutyMode::Ddp => write!(f, "DDP"),
            DutyMode::Ddu => write!(f, "DDU"),
        }
    }
}

// ============================================================================
// PRODUCT FACTS
// ============================================================================

/// Everything the engine needs to know about one listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    /// Acquisition cost in yen
    pub cost_jpy: Jpy,
    pub actual_weight_kg: f64,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub origin_country: CountryCode,
    pub destination_country: CountryCode,
    pub hs_code: String,
    #[serde(default)]
    pub store_type: StoreType,
    /// Fees recoverable after the sale (e.g. export consumption-tax refund)
    #[serde(default)]
    pub refundable_fees_jpy: Jpy,
    /// Marketplace category used for the fee-schedule lookup
    pub category: String,
    /// Marketplace key for the payment-gateway table (e.g. "ebay_us")
    pub marketplace: String,
    #[serde(default)]
    pub condition: Condition,
    /// Candidate price the buyer pays in total; suggested when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price_usd: Option<Usd>,
}

impl PricingRequest {
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.cost_jpy.is_finite() || self.cost_jpy.value() <= 0.0 {
            return Err(PricingError::calculation(format!(
                "cost_jpy must be positive, got {}",
                self.cost_jpy.value()
            )));
        }
        for (field, value) in [
            ("actual_weight_kg", self.actual_weight_kg),
            ("length_cm", self.length_cm),
            ("width_cm", self.width_cm),
            ("height_cm", self.height_cm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PricingError::calculation(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }
        if !self.refundable_fees_jpy.is_finite() || self.refundable_fees_jpy.is_negative() {
            return Err(PricingError::calculation("refundable_fees_jpy must be non-negative"));
        }
        if let Some(price) = self.selling_price_usd {
            if !price.is_finite() || price.is_negative() {
                return Err(PricingError::calculation("selling_price_usd must be non-negative"));
            }
        }
        for (field, country) in [
            ("origin_country", &self.origin_country),
            ("destination_country", &self.destination_country),
        ] {
            if !country.is_well_formed() {
                return Err(PricingError::calculation(format!(
                    "{} '{}' is not an ISO alpha-2 code",
                    field, country
                )));
            }
        }
        if self.hs_code.trim().is_empty() {
            return Err(PricingError::calculation("hs_code is empty"));
        }
        Ok(())
    }
}

// ============================================================================
// SHIPPING
// ============================================================================

/// Per-zone rate row of a shipping policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRate {
    pub zone_code: String,
    /// Shipping amount shown to the buyer
    pub display_shipping_usd: Usd,
    /// What the carrier actually charges
    pub actual_cost_usd: Usd,
    #[serde(default)]
    pub handling_fee_ddp_usd: Usd,
    #[serde(default)]
    pub handling_fee_ddu_usd: Usd,
}

impl ZoneRate {
    pub fn handling_fee(&self, mode: DutyMode) -> Usd {
        match mode {
            DutyMode::Ddp => self.handling_fee_ddp_usd,
            DutyMode::Ddu => self.handling_fee_ddu_usd,
        }
    }
}

/// A weight-banded shipping policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub weight_min_kg: f64,
    pub weight_max_kg: f64,
    /// Representative product price the policy was built for
    #[serde(default)]
    pub price_usd: Usd,
    pub zones: Vec<ZoneRate>,
}

impl ShippingPolicy {
    /// Inclusive at both ends
    pub fn covers(&self, weight_kg: f64) -> bool {
        weight_kg >= self.weight_min_kg && weight_kg <= self.weight_max_kg
    }

    pub fn range_width(&self) -> f64 {
        self.weight_max_kg - self.weight_min_kg
    }

    pub fn zone(&self, zone_code: &str) -> Option<&ZoneRate> {
        self.zones
            .iter()
            .find(|z| z.zone_code.eq_ignore_ascii_case(zone_code))
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.weight_min_kg.is_finite()
            || !self.weight_max_kg.is_finite()
            || self.weight_min_kg < 0.0
            || self.weight_min_kg > self.weight_max_kg
        {
            return Err(PricingError::calculation(format!(
                "policy {} has an invalid weight range [{}, {}]",
                self.id, self.weight_min_kg, self.weight_max_kg
            )));
        }
        for zone in &self.zones {
            let amounts = [
                zone.display_shipping_usd,
                zone.actual_cost_usd,
                zone.handling_fee_ddp_usd,
                zone.handling_fee_ddu_usd,
            ];
            if amounts.iter().any(|a| !a.is_finite() || a.is_negative()) {
                return Err(PricingError::calculation(format!(
                    "policy {} zone {} has a negative or non-finite amount",
                    self.id, zone.zone_code
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// FEES, MARGINS, RATES, TARIFFS
// ============================================================================

/// Marketplace fee schedule for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFeeSchedule {
    /// Final value fee as a fraction of the selling price
    pub fvf: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<Usd>,
    #[serde(default)]
    pub insertion_fee: Usd,
}

impl CategoryFeeSchedule {
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(0.0..1.0).contains(&self.fvf) {
            return Err(PricingError::calculation(format!(
                "fvf must be in [0, 1), got {}",
                self.fvf
            )));
        }
        if self.cap.is_some_and(|c| !c.is_finite() || c.is_negative()) {
            return Err(PricingError::calculation("fee cap must be non-negative"));
        }
        if !self.insertion_fee.is_finite() || self.insertion_fee.is_negative() {
            return Err(PricingError::calculation("insertion fee must be non-negative"));
        }
        Ok(())
    }
}

/// Minimum profit thresholds for a destination and condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginSetting {
    pub country_code: CountryCode,
    #[serde(default)]
    pub condition: Condition,
    /// Target margin used when suggesting a price
    pub default_margin: f64,
    pub min_margin: f64,
    pub min_amount: Jpy,
}

impl MarginSetting {
    pub fn validate(&self) -> Result<(), PricingError> {
        let ordered = 0.0 <= self.min_margin
            && self.min_margin <= self.default_margin
            && self.default_margin < 1.0;
        if !ordered {
            return Err(PricingError::calculation(format!(
                "margin setting {}/{:?} requires 0 <= min_margin ({}) <= default_margin ({}) < 1",
                self.country_code, self.condition, self.min_margin, self.default_margin
            )));
        }
        if !self.min_amount.is_finite() {
            return Err(PricingError::calculation("min_amount must be finite"));
        }
        Ok(())
    }
}

/// Yen per dollar, with a buffer against the yen strengthening before the sale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub spot: f64,
    #[serde(default)]
    pub buffer: f64,
}

impl ExchangeRate {
    pub fn new(spot: f64, buffer: f64) -> Self {
        Self { spot, buffer }
    }

    /// Spot moved by the buffer in the seller-protective direction: fewer
    /// yen per dollar, so every yen cost converts to more dollars.
    pub fn safe(&self) -> f64 {
        self.spot - self.buffer
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(PricingError::calculation(format!(
                "spot rate must be positive, got {}",
                self.spot
            )));
        }
        if !self.buffer.is_finite() || self.buffer < 0.0 || self.buffer >= self.spot {
            return Err(PricingError::calculation(format!(
                "rate buffer must be in [0, spot), got {}",
                self.buffer
            )));
        }
        Ok(())
    }
}

/// Tariff line for an HS code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsCodeRecord {
    pub code: String,
    pub general_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_duties: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HsCodeRecord {
    pub fn validate(&self) -> Result<(), PricingError> {
        let rates = [
            Some(self.general_rate),
            self.special_rate,
            self.additional_duties,
        ];
        if rates.iter().flatten().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(PricingError::calculation(format!(
                "HS code {} has a negative or non-finite rate",
                self.code
            )));
        }
        Ok(())
    }
}
