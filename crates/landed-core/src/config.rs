//! Engine configuration
//!
//! Loaded from YAML; every field has a default so a partial file (or none
//! at all) yields a working engine.

use crate::error::ConfigError;
use crate::model::{CountryCode, StoreType};
use crate::money::Usd;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// International air freight standard, cm³ per kg
pub const DEFAULT_VOLUMETRIC_DIVISOR: f64 = 5000.0;

/// Fee-table entry used when a category has no schedule of its own
pub const DEFAULT_FEE_CATEGORY: &str = "Default";

/// Payment-processor fee: `price * rate + fixed`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub rate: f64,
    pub fixed: Usd,
}

/// Final value fee discount per store subscription
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDiscounts {
    pub none: f64,
    pub basic: f64,
    pub premium: f64,
}

impl StoreDiscounts {
    pub fn for_store(&self, store: StoreType) -> f64 {
        match store {
            StoreType::None => self.none,
            StoreType::Basic => self.basic,
            StoreType::Premium => self.premium,
        }
    }
}

impl Default for StoreDiscounts {
    fn default() -> Self {
        Self {
            none: 0.0,
            basic: 0.04,
            premium: 0.06,
        }
    }
}

/// US merchandise processing fee, as a share of the sale price
pub const US_MPF_RATE: f64 = 0.003464;

/// Flat customs-brokerage fee a DDP carrier charges per US entry
pub const US_DDP_BROKERAGE_FEE_USD: f64 = 15.0;

/// Per-entry customs charges the seller pays under DDP, on top of duty
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomsCharges {
    /// Processing fee as a share of the selling price
    pub mpf_rate: f64,
    pub brokerage_fee_usd: Usd,
}

impl CustomsCharges {
    pub fn us_formal_entry() -> Self {
        Self {
            mpf_rate: US_MPF_RATE,
            brokerage_fee_usd: Usd(US_DDP_BROKERAGE_FEE_USD),
        }
    }

    /// MPF plus brokerage at `selling_price`
    pub fn total(&self, selling_price: Usd) -> Usd {
        selling_price * self.mpf_rate + self.brokerage_fee_usd
    }
}

/// Origin/destination pair that qualifies for preferential tariff rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeAgreement {
    pub name: String,
    pub origin: CountryCode,
    pub destination: CountryCode,
}

impl TradeAgreement {
    pub fn new(name: &str, origin: &str, destination: &str) -> Self {
        Self {
            name: name.to_string(),
            origin: CountryCode::new(origin),
            destination: CountryCode::new(destination),
        }
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Divisor turning L*W*H (cm³) into volumetric kg
    pub volumetric_divisor: f64,

    pub store_discounts: StoreDiscounts,

    /// Overrides of the built-in payment-gateway table, keyed by marketplace
    pub payment_gateways: BTreeMap<String, PaymentGateway>,

    pub trade_agreements: Vec<TradeAgreement>,

    /// Destination country to shipping-zone code
    pub zone_aliases: BTreeMap<CountryCode, String>,

    /// Extra tariff rate by origin country, stacked on every HS rate
    pub origin_surcharges: BTreeMap<CountryCode, f64>,

    /// DDP customs charges by destination; absent means none
    pub customs_charges: BTreeMap<CountryCode, CustomsCharges>,

    pub default_fee_category: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let zone_aliases = ["DE", "FR", "IT", "ES", "NL", "BE", "AT", "IE"]
            .into_iter()
            .map(|c| (CountryCode::new(c), "EU".to_string()))
            .collect();

        Self {
            volumetric_divisor: DEFAULT_VOLUMETRIC_DIVISOR,
            store_discounts: StoreDiscounts::default(),
            payment_gateways: BTreeMap::new(),
            trade_agreements: vec![
                TradeAgreement::new("Japan-Australia EPA", "JP", "AU"),
                TradeAgreement::new("UK-Japan CEPA", "JP", "GB"),
                TradeAgreement::new("CPTPP", "JP", "CA"),
            ],
            zone_aliases,
            origin_surcharges: BTreeMap::new(),
            customs_charges: BTreeMap::new(),
            default_fee_category: DEFAULT_FEE_CATEGORY.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load config from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.volumetric_divisor.is_finite() || self.volumetric_divisor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "volumetric_divisor must be positive, got {}",
                self.volumetric_divisor
            )));
        }
        let discounts = [
            self.store_discounts.none,
            self.store_discounts.basic,
            self.store_discounts.premium,
        ];
        if discounts.iter().any(|d| !(0.0..1.0).contains(d)) {
            return Err(ConfigError::Invalid("store discounts must be in [0, 1)".to_string()));
        }
        for (marketplace, gateway) in &self.payment_gateways {
            if !(0.0..1.0).contains(&gateway.rate) || gateway.fixed.is_negative() {
                return Err(ConfigError::Invalid(format!(
                    "payment gateway for {} has an invalid rate or fixed fee",
                    marketplace
                )));
            }
        }
        for (origin, rate) in &self.origin_surcharges {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "origin surcharge for {} must be non-negative, got {}",
                    origin, rate
                )));
            }
        }
        for (destination, charges) in &self.customs_charges {
            if !(0.0..1.0).contains(&charges.mpf_rate)
                || !charges.brokerage_fee_usd.is_finite()
                || charges.brokerage_fee_usd.is_negative()
            {
                return Err(ConfigError::Invalid(format!(
                    "customs charges for {} have an invalid rate or fee",
                    destination
                )));
            }
        }
        Ok(())
    }

    pub fn origin_surcharge(&self, origin: &CountryCode) -> f64 {
        self.origin_surcharges.get(origin).copied().unwrap_or(0.0)
    }

    pub fn customs_for(&self, destination: &CountryCode) -> CustomsCharges {
        self.customs_charges.get(destination).copied().unwrap_or_default()
    }

    /// Whether origin → destination enjoys preferential rates
    pub fn has_trade_agreement(&self, origin: &CountryCode, destination: &CountryCode) -> bool {
        self.trade_agreements
            .iter()
            .any(|a| &a.origin == origin && &a.destination == destination)
    }
}
