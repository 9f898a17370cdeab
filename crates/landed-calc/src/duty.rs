//! Import duty for DDP shipments
use landed_core::{
    DutyQuote, EngineConfig, HsCodeTable, PricingError, PricingRequest, RateKind, Usd,
};

pub struct DutyCalculator<'a> {
    hs_codes: &'a HsCodeTable,
    config: &'a EngineConfig,
}

impl<'a> DutyCalculator<'a> {
    pub fn new(hs_codes: &'a HsCodeTable, config: &'a EngineConfig) -> Self {
        Self { hs_codes, config }
    }

    /// Duty on `cost + freight`.
    ///
    /// The special rate applies only when the record carries one and the
    /// origin/destination pair is a configured trade agreement. Additional
    /// duties and the origin surcharge stack on top of whichever base rate
    /// applied.
    pub fn quote(
        &self,
        request: &PricingRequest,
        cost_usd_safe: Usd,
        shipping_cost_usd: Usd,
    ) -> Result<DutyQuote, PricingError> {
        let (record, lookup) = self
            .hs_codes
            .lookup(&request.hs_code)
            .ok_or_else(|| PricingError::UnknownHsCode(request.hs_code.clone()))?;

        let preferential = self
            .config
            .has_trade_agreement(&request.origin_country, &request.destination_country);

        let (rate_kind, base_rate) = match record.special_rate {
            Some(special) if preferential => (RateKind::Special, special),
            _ => (RateKind::General, record.general_rate),
        };
        let additional_rate = record.additional_duties.unwrap_or(0.0);
        let origin_surcharge_rate = self.config.origin_surcharge(&request.origin_country);
        let applicable_rate = base_rate + additional_rate + origin_surcharge_rate;

        let dutiable_value_usd = cost_usd_safe + shipping_cost_usd;
        let duty_usd = dutiable_value_usd * applicable_rate;

        tracing::trace!(
            hs_code = %record.code,
            ?lookup,
            ?rate_kind,
            applicable_rate,
            duty = %duty_usd,
            "duty quoted"
        );

        Ok(DutyQuote {
            hs_code: record.code.clone(),
            lookup,
            rate_kind,
            base_rate,
            additional_rate,
            origin_surcharge_rate,
            applicable_rate,
            dutiable_value_usd,
            duty_usd,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::{Condition, HsCodeRecord, HsLookup, Jpy, StoreType};

    fn request(destination: &str, hs_code: &str) -> PricingRequest {
        PricingRequest {
            cost_jpy: Jpy(3000.0),
            actual_weight_kg: 0.4,
            length_cm: 0.0,
            width_cm: 0.0,
            height_cm: 0.0,
            origin_country: "JP".into(),
            destination_country: destination.into(),
            hs_code: hs_code.to_string(),
            store_type: StoreType::None,
            refundable_fees_jpy: Jpy::ZERO,
            category: "Toys".to_string(),
            marketplace: "ebay_us".to_string(),
            condition: Condition::New,
            selling_price_usd: None,
        }
    }

    fn table() -> HsCodeTable {
        HsCodeTable::from(vec![
            HsCodeRecord {
                code: "9504.50.0000".to_string(),
                general_rate: 0.05,
                special_rate: Some(0.0),
                additional_duties: None,
                description: Some("Video game consoles".to_string()),
            },
            HsCodeRecord {
                code: "8471.30".to_string(),
                general_rate: 0.0,
                special_rate: None,
                additional_duties: Some(0.25),
                description: None,
            },
        ])
    }

    #[test]
    fn test_general_rate_without_agreement() {
        let hs = table();
        let config = EngineConfig::default();
        let quote = DutyCalculator::new(&hs, &config)
            .quote(&request("US", "9504.50.0000"), Usd(20.0), Usd(15.0))
            .unwrap();
        assert_eq!(quote.rate_kind, RateKind::General);
        assert_eq!(quote.dutiable_value_usd, Usd(35.0));
        assert!((quote.duty_usd.value() - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_special_rate_under_agreement() {
        let hs = table();
        let config = EngineConfig::default();
        let quote = DutyCalculator::new(&hs, &config)
            .quote(&request("AU", "9504500000"), Usd(20.0), Usd(15.0))
            .unwrap();
        assert_eq!(quote.rate_kind, RateKind::Special);
        assert_eq!(quote.lookup, HsLookup::DigitsOnly);
        assert_eq!(quote.duty_usd, Usd::ZERO);
    }

    #[test]
    fn test_additional_duties_stack() {
        let hs = table();
        let config = EngineConfig::default();
        let quote = DutyCalculator::new(&hs, &config)
            .quote(&request("US", "8471.30.0100"), Usd(80.0), Usd(20.0))
            .unwrap();
        assert_eq!(quote.lookup, HsLookup::Subheading);
        assert_eq!(quote.applicable_rate, 0.25);
        assert!((quote.duty_usd.value() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_origin_surcharge_stacks() {
        let hs = table();
        let mut config = EngineConfig::default();
        config.origin_surcharges.insert("CN".into(), 0.30);

        let mut from_china = request("US", "8471.30.0100");
        from_china.origin_country = "CN".into();
        let quote = DutyCalculator::new(&hs, &config)
            .quote(&from_china, Usd(80.0), Usd(20.0))
            .unwrap();
        assert_eq!(quote.origin_surcharge_rate, 0.30);
        assert!((quote.applicable_rate - 0.55).abs() < 1e-12);
        assert!((quote.duty_usd.value() - 55.0).abs() < 1e-9);

        // Other origins are untouched
        let quote = DutyCalculator::new(&hs, &config)
            .quote(&request("US", "8471.30.0100"), Usd(80.0), Usd(20.0))
            .unwrap();
        assert_eq!(quote.origin_surcharge_rate, 0.0);
        assert!((quote.duty_usd.value() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_code() {
        let hs = table();
        let config = EngineConfig::default();
        let err = DutyCalculator::new(&hs, &config)
            .quote(&request("US", "0101.21"), Usd(20.0), Usd(15.0))
            .unwrap_err();
        assert_eq!(err, PricingError::UnknownHsCode("0101.21".to_string()));
    }
}
