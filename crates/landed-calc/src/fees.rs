//! Marketplace and payment-processor fees
//!
//! Fee terms are resolved once per product (category schedule, store
//! discount, gateway) and then quoted at any selling price. Price
//! suggestion needs the terms before a price exists, which is why the two
//! steps are separate.

use landed_core::{
    CategoryFeeSchedule, EngineConfig, FeeQuote, FeeScheduleTable, PaymentGateway, PricingError,
    PricingRequest, Usd,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built-in gateway fees by marketplace. Marketplaces with managed payments
/// fold processing into the final value fee and are absent here.
pub static PAYMENT_GATEWAYS: Lazy<BTreeMap<&'static str, PaymentGateway>> = Lazy::new(|| {
    let mut gateways = BTreeMap::new();
    gateways.insert(
        "ebay_legacy_paypal",
        PaymentGateway {
            rate: 0.0349,
            fixed: Usd(0.49),
        },
    );
    gateways.insert(
        "shopee_sg",
        PaymentGateway {
            rate: 0.02,
            fixed: Usd::ZERO,
        },
    );
    gateways.insert(
        "qoo10_sg",
        PaymentGateway {
            rate: 0.035,
            fixed: Usd::ZERO,
        },
    );
    gateways
});

/// Fee terms for one product, independent of price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTerms {
    /// Fee-table key that matched (the category or the default entry)
    pub category: String,
    /// FVF after store discount, never below zero
    pub fvf_rate: f64,
    pub cap: Option<Usd>,
    pub insertion_fee: Usd,
    pub gateway: Option<PaymentGateway>,
}

impl FeeTerms {
    pub fn quote(&self, selling_price: Usd) -> FeeQuote {
        let uncapped = selling_price * self.fvf_rate;
        let (final_value_fee, capped) = match self.cap {
            Some(cap) if uncapped > cap => (cap, true),
            _ => (uncapped, false),
        };
        let payment_fee = self
            .gateway
            .map(|g| selling_price * g.rate + g.fixed)
            .unwrap_or(Usd::ZERO);

        FeeQuote {
            fvf_rate: self.fvf_rate,
            final_value_fee,
            capped,
            insertion_fee: self.insertion_fee,
            payment_fee,
        }
    }

    pub fn payment_rate(&self) -> f64 {
        self.gateway.map(|g| g.rate).unwrap_or(0.0)
    }

    pub fn payment_fixed(&self) -> Usd {
        self.gateway.map(|g| g.fixed).unwrap_or(Usd::ZERO)
    }
}

pub struct FeeCalculator<'a> {
    fees: &'a FeeScheduleTable,
    config: &'a EngineConfig,
}

impl<'a> FeeCalculator<'a> {
    pub fn new(fees: &'a FeeScheduleTable, config: &'a EngineConfig) -> Self {
        Self { fees, config }
    }

    /// Config override first, then the built-in table.
    pub fn gateway_for(&self, marketplace: &str) -> Option<PaymentGateway> {
        self.config
            .payment_gateways
            .get(marketplace)
            .or_else(|| PAYMENT_GATEWAYS.get(marketplace))
            .copied()
    }

    pub fn terms(&self, request: &PricingRequest) -> Result<FeeTerms, PricingError> {
        let (category, schedule) = self
            .fees
            .resolve(&request.category, &self.config.default_fee_category)
            .ok_or_else(|| PricingError::NoCategoryFee(request.category.clone()))?;

        let discount = self.config.store_discounts.for_store(request.store_type);
        Ok(self.build_terms(category, schedule, discount, &request.marketplace))
    }

    fn build_terms(
        &self,
        category: &str,
        schedule: &CategoryFeeSchedule,
        discount: f64,
        marketplace: &str,
    ) -> FeeTerms {
        FeeTerms {
            category: category.to_string(),
            fvf_rate: (schedule.fvf - discount).max(0.0),
            cap: schedule.cap,
            insertion_fee: schedule.insertion_fee,
            gateway: self.gateway_for(marketplace),
        }
    }
}
