//! Reference data shared read-only by every item of a batch
use crate::config::BatchConfig;
use landed_core::{
    ConfigError, EngineConfig, ExchangeRate, FeeScheduleTable, HsCodeTable, MarginTable, PricingError,
    PricingInputs, PricingRequest, ShippingPolicy,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingCatalog {
    /// Candidate policies; order breaks selection ties
    pub policies: Vec<ShippingPolicy>,
    pub fees: FeeScheduleTable,
    pub margins: MarginTable,
    pub rate: ExchangeRate,
    pub hs_codes: HsCodeTable,
}

impl PricingCatalog {
    pub fn validate(&self) -> Result<(), PricingError> {
        self.policies.iter().try_for_each(|p| p.validate())?;
        self.fees.validate()?;
        self.margins.validate()?;
        self.rate.validate()?;
        self.hs_codes.validate()
    }

    /// Inputs for one request, with the margin setting resolved
    pub fn inputs_for<'a>(&'a self, request: &'a PricingRequest) -> Result<PricingInputs<'a>, PricingError> {
        let margin = self
            .margins
            .resolve(&request.destination_country, request.condition)
            .ok_or_else(|| {
                PricingError::calculation(format!(
                    "no margin setting for {} ({:?}) and no DEFAULT row",
                    request.destination_country, request.condition
                ))
            })?;

        Ok(PricingInputs {
            request,
            policies: &self.policies,
            fees: &self.fees,
            margin,
            rate: &self.rate,
            hs_codes: &self.hs_codes,
        })
    }
}

/// Catalog file layout: engine and batch settings travel with the data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    pub policies: Vec<ShippingPolicy>,
    pub fees: FeeScheduleTable,
    pub margins: MarginTable,
    pub rate: ExchangeRate,
    pub hs_codes: HsCodeTable,
}

impl CatalogFile {
    /// Parse and validate every section
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: Self = serde_yaml::from_str(yaml)?;
        file.engine.validate()?;
        file.batch.validate()?;
        Ok(file)
    }

    pub fn into_parts(self) -> Result<(EngineConfig, BatchConfig, PricingCatalog), ConfigError> {
        let catalog = PricingCatalog {
            policies: self.policies,
            fees: self.fees,
            margins: self.margins,
            rate: self.rate,
            hs_codes: self.hs_codes,
        };
        catalog
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok((self.engine, self.batch, catalog))
    }
}
