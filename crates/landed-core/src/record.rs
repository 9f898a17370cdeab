//! Data-store boundary
//!
//! Product rows arrive with inconsistent column names depending on which
//! importer wrote them. `RawProductRecord` accepts every known spelling;
//! converting it into `ProductFacts` resolves each field through an ordered
//! list of sources and validates the result, so nothing loosely typed gets
//! past this module.

use crate::config::DEFAULT_FEE_CATEGORY;
use crate::error::PricingError;
use crate::model::{Condition, CountryCode, PricingRequest, StoreType};
use crate::money::{Jpy, Usd};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DESTINATION: &str = "US";
pub const DEFAULT_MARKETPLACE: &str = "ebay_us";
pub const DEFAULT_DIMENSION_CM: f64 = 0.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("RECORD/{product_id}: missing {field} (looked at {tried})")]
    MissingField {
        product_id: String,
        field: &'static str,
        tried: String,
    },

    #[error("RECORD/{product_id}: {source}")]
    Invalid {
        product_id: String,
        #[source]
        source: PricingError,
    },
}

/// Product row as stored, with legacy column spellings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProductRecord {
    pub product_id: String,
    pub cost_jpy: Option<f64>,
    pub purchase_price_jpy: Option<f64>,
    pub weight_kg: Option<f64>,
    pub actual_weight: Option<f64>,
    pub weight_g: Option<f64>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub origin_country: Option<String>,
    pub destination_country: Option<String>,
    pub hs_code: Option<String>,
    pub hts_code: Option<String>,
    pub category: Option<String>,
    pub ebay_category: Option<String>,
    pub marketplace: Option<String>,
    pub store_type: Option<StoreType>,
    pub condition: Option<Condition>,
    pub refundable_fees_jpy: Option<f64>,
    pub selling_price_usd: Option<f64>,
}

/// Validated product facts ready for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFacts {
    pub product_id: String,
    pub request: PricingRequest,
}

/// A named source for one field
type Source<T> = (&'static str, Option<T>);

fn first_present<T>(sources: Vec<Source<T>>) -> Option<T> {
    sources.into_iter().find_map(|(_, value)| value)
}

fn tried<T>(sources: &[Source<T>]) -> String {
    sources.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", ")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RawProductRecord {
    fn require<T>(&self, field: &'static str, sources: Vec<Source<T>>) -> Result<T, RecordError> {
        let names = tried(&sources);
        first_present(sources).ok_or_else(|| RecordError::MissingField {
            product_id: self.product_id.clone(),
            field,
            tried: names,
        })
    }

    fn cost_sources(&self) -> Vec<Source<f64>> {
        vec![
            ("cost_jpy", self.cost_jpy),
            ("purchase_price_jpy", self.purchase_price_jpy),
        ]
    }

    fn weight_sources(&self) -> Vec<Source<f64>> {
        vec![
            ("weight_kg", self.weight_kg),
            ("actual_weight", self.actual_weight),
            ("weight_g", self.weight_g.map(|g| g / 1000.0)),
        ]
    }

    fn hs_sources(&self) -> Vec<Source<&str>> {
        vec![
            ("hs_code", non_blank(&self.hs_code)),
            ("hts_code", non_blank(&self.hts_code)),
        ]
    }

    fn category_sources(&self) -> Vec<Source<&str>> {
        vec![
            ("category", non_blank(&self.category)),
            ("ebay_category", non_blank(&self.ebay_category)),
            ("DEFAULT_FEE_CATEGORY", Some(DEFAULT_FEE_CATEGORY)),
        ]
    }
}

impl TryFrom<RawProductRecord> for ProductFacts {
    type Error = RecordError;

    fn try_from(raw: RawProductRecord) -> Result<Self, Self::Error> {
        let cost = raw.require("cost", raw.cost_sources())?;
        let weight = raw.require("weight", raw.weight_sources())?;
        let hs_code = raw.require("hs_code", raw.hs_sources())?.to_string();
        let origin = raw.require(
            "origin_country",
            vec![("origin_country", non_blank(&raw.origin_country))],
        )?;
        let category = raw.require("category", raw.category_sources())?.to_string();

        let destination = non_blank(&raw.destination_country).unwrap_or(DEFAULT_DESTINATION);
        let marketplace = non_blank(&raw.marketplace).unwrap_or(DEFAULT_MARKETPLACE);

        let request = PricingRequest {
            cost_jpy: Jpy(cost),
            actual_weight_kg: weight,
            length_cm: raw.length_cm.unwrap_or(DEFAULT_DIMENSION_CM),
            width_cm: raw.width_cm.unwrap_or(DEFAULT_DIMENSION_CM),
            height_cm: raw.height_cm.unwrap_or(DEFAULT_DIMENSION_CM),
            origin_country: CountryCode::new(origin),
            destination_country: CountryCode::new(destination),
            hs_code,
            store_type: raw.store_type.unwrap_or_default(),
            refundable_fees_jpy: Jpy(raw.refundable_fees_jpy.unwrap_or(0.0)),
            category,
            marketplace: marketplace.to_string(),
            condition: raw.condition.unwrap_or_default(),
            selling_price_usd: raw.selling_price_usd.map(Usd),
        };

        request.validate().map_err(|source| RecordError::Invalid {
            product_id: raw.product_id.clone(),
            source,
        })?;

        Ok(ProductFacts {
            product_id: raw.product_id,
            request,
        })
    }
}
