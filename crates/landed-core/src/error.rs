//! Unified Error Model
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Per-item evaluation failure. Fatal to one product, never to a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("POLICY/no shipping policy covers {billable_weight_kg} kg: {detail}")]
    NoMatchingPolicy {
        billable_weight_kg: f64,
        detail: String,
    },

    #[error("FEE/no fee schedule for category '{0}'")]
    NoCategoryFee(String),

    #[error("HS/unknown HS code '{0}'")]
    UnknownHsCode(String),

    #[error("CALC/{0}")]
    CalculationError(String),
}

impl PricingError {
    pub fn calculation(message: impl Into<String>) -> Self {
        PricingError::CalculationError(message.into())
    }

    /// Serializable reason kind for persistence
    pub fn reason(&self) -> PricingFailure {
        match self {
            PricingError::NoMatchingPolicy { .. } => PricingFailure::NoMatchingPolicy,
            PricingError::NoCategoryFee(_) => PricingFailure::NoCategoryFee,
            PricingError::UnknownHsCode(_) => PricingFailure::UnknownHsCode,
            PricingError::CalculationError(_) => PricingFailure::CalculationError,
        }
    }
}

/// Reason a product did not come out profitable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PricingFailure {
    NoMatchingPolicy,
    NoCategoryFee,
    UnknownHsCode,
    /// Evaluation succeeded but the thresholds were not met
    InsufficientProfit,
    CalculationError,
}

impl PricingFailure {
    /// Business outcome rather than a computation error
    pub fn is_business_outcome(&self) -> bool {
        matches!(self, PricingFailure::InsufficientProfit)
    }
}

impl fmt::Display for PricingFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let code = match self {
            PricingFailure::NoMatchingPolicy => "NO_MATCHING_POLICY",
            PricingFailure::NoCategoryFee => "NO_CATEGORY_FEE",
            PricingFailure::UnknownHsCode => "UNKNOWN_HS_CODE",
            PricingFailure::InsufficientProfit => "INSUFFICIENT_PROFIT",
            PricingFailure::CalculationError => "CALCULATION_ERROR",
        };
        f.write_str(code)
    }
}

/// Configuration could not be loaded or is inconsistent
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG/parse: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("CONFIG/invalid: {0}")]
    Invalid(String),
}
