//! Billable weight and shipping-policy resolution
//!
//! Carriers bill on whichever is larger of actual and dimensional weight,
//! so the resolver never lets a bulky, light parcel price below its real
//! freight.

use landed_core::config::DEFAULT_VOLUMETRIC_DIVISOR;
use landed_core::{
    BillableWeight, CountryCode, EngineConfig, PolicyMatch, PricingError, PricingRequest,
    ShippingPolicy, ZoneLookup,
};

/// Zone row that applies to every destination without a closer match
pub const DEFAULT_ZONE_CODE: &str = "WORLDWIDE";

/// Order in which a policy's zone rows are consulted
pub const ZONE_LOOKUP_ORDER: [ZoneLookup; 3] = [
    ZoneLookup::ExactCountry,
    ZoneLookup::ConfiguredZone,
    ZoneLookup::Wildcard,
];

/// Turns dimensions into billable weight
#[derive(Debug, Clone, Copy)]
pub struct WeightBandResolver {
    volumetric_divisor: f64,
}

impl Default for WeightBandResolver {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUMETRIC_DIVISOR)
    }
}

impl WeightBandResolver {
    pub fn new(volumetric_divisor: f64) -> Self {
        Self { volumetric_divisor }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.volumetric_divisor)
    }

    /// `L*W*H / divisor`
    pub fn volumetric_weight(&self, length_cm: f64, width_cm: f64, height_cm: f64) -> f64 {
        (length_cm * width_cm * height_cm) / self.volumetric_divisor
    }

    pub fn billable_weight(
        &self,
        actual_kg: f64,
        length_cm: f64,
        width_cm: f64,
        height_cm: f64,
    ) -> BillableWeight {
        let volumetric_kg = self.volumetric_weight(length_cm, width_cm, height_cm);
        BillableWeight {
            actual_kg,
            volumetric_kg,
            billable_kg: actual_kg.max(volumetric_kg),
        }
    }

    pub fn for_request(&self, request: &PricingRequest) -> BillableWeight {
        self.billable_weight(
            request.actual_weight_kg,
            request.length_cm,
            request.width_cm,
            request.height_cm,
        )
    }
}

/// Candidate shipping policies, in caller order
#[derive(Debug, Clone, Copy)]
pub struct RateMatrix<'a> {
    policies: &'a [ShippingPolicy],
}

impl<'a> RateMatrix<'a> {
    pub fn new(policies: &'a [ShippingPolicy]) -> Self {
        Self { policies }
    }

    /// Narrowest covering range wins; equal widths keep input order.
    pub fn select_policy(&self, billable_kg: f64) -> Result<&'a ShippingPolicy, PricingError> {
        let mut best: Option<&'a ShippingPolicy> = None;
        for policy in self.policies.iter().filter(|p| p.covers(billable_kg)) {
            match best {
                Some(current) if current.range_width() <= policy.range_width() => {}
                _ => best = Some(policy),
            }
        }
        best.ok_or_else(|| PricingError::NoMatchingPolicy {
            billable_weight_kg: billable_kg,
            detail: format!("{} candidate policies, none cover this weight", self.policies.len()),
        })
    }

    /// Full resolution: policy by weight, then zone row by destination.
    pub fn resolve(
        &self,
        billable_kg: f64,
        destination: &CountryCode,
        config: &EngineConfig,
    ) -> Result<PolicyMatch, PricingError> {
        let policy = self.select_policy(billable_kg)?;

        let (zone, zone_lookup) = ZONE_LOOKUP_ORDER
            .iter()
            .find_map(|strategy| {
                let code = match strategy {
                    ZoneLookup::ExactCountry => Some(destination.as_str()),
                    ZoneLookup::ConfiguredZone => config.zone_aliases.get(destination).map(String::as_str),
                    ZoneLookup::Wildcard => Some(DEFAULT_ZONE_CODE),
                };
                code.and_then(|c| policy.zone(c)).map(|z| (z, *strategy))
            })
            .ok_or_else(|| PricingError::NoMatchingPolicy {
                billable_weight_kg: billable_kg,
                detail: format!("policy {} has no zone for {}", policy.id, destination),
            })?;

        Ok(PolicyMatch {
            policy_id: policy.id.clone(),
            policy_name: policy.name.clone(),
            weight_min_kg: policy.weight_min_kg,
            weight_max_kg: policy.weight_max_kg,
            zone: zone.clone(),
            zone_lookup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::{Usd, ZoneRate};
    use proptest::prelude::*;

    fn zone(code: &str, cost: f64) -> ZoneRate {
        ZoneRate {
            zone_code: code.to_string(),
            display_shipping_usd: Usd(cost),
            actual_cost_usd: Usd(cost),
            handling_fee_ddp_usd: Usd::ZERO,
            handling_fee_ddu_usd: Usd::ZERO,
        }
    }

    fn policy(id: &str, min: f64, max: f64) -> ShippingPolicy {
        ShippingPolicy {
            id: id.to_string(),
            name: id.to_string(),
            weight_min_kg: min,
            weight_max_kg: max,
            price_usd: Usd::ZERO,
            zones: vec![zone("US", 15.0), zone("EU", 18.0), zone(DEFAULT_ZONE_CODE, 25.0)],
        }
    }

    #[test]
    fn test_volumetric_dominates() {
        let resolver = WeightBandResolver::default();
        // 40 x 30 x 20 = 24000 cm³ → 4.8 kg
        let weight = resolver.billable_weight(1.0, 40.0, 30.0, 20.0);
        assert!((weight.volumetric_kg - 4.8).abs() < 1e-12);
        assert_eq!(weight.billable_kg, weight.volumetric_kg);
        assert!(weight.is_volumetric());
    }

    #[test]
    fn test_actual_dominates() {
        let weight = WeightBandResolver::default().billable_weight(2.0, 10.0, 10.0, 10.0);
        assert_eq!(weight.billable_kg, 2.0);
        assert!(!weight.is_volumetric());
    }

    #[test]
    fn test_narrowest_range_wins() {
        let policies = vec![policy("wide", 0.0, 5.0), policy("narrow", 0.5, 1.0)];
        let selected = RateMatrix::new(&policies).select_policy(0.8).unwrap();
        assert_eq!(selected.id, "narrow");
    }

    #[test]
    fn test_shared_boundary_is_deterministic() {
        // 0.6 is A's max and B's min; equal widths → input order decides.
        let policies = vec![policy("A", 0.3, 0.6), policy("B", 0.6, 0.9)];
        let matrix = RateMatrix::new(&policies);
        assert_eq!(matrix.select_policy(0.6).unwrap().id, "A");

        // Narrower B wins regardless of order.
        let policies = vec![policy("A", 0.3, 0.6), policy("B", 0.6, 0.8)];
        assert_eq!(RateMatrix::new(&policies).select_policy(0.6).unwrap().id, "B");
    }

    #[test]
    fn test_no_policy_covers() {
        let policies = vec![policy("A", 0.3, 0.6)];
        let err = RateMatrix::new(&policies).select_policy(2.0).unwrap_err();
        assert!(matches!(err, PricingError::NoMatchingPolicy { .. }));
    }

    #[test]
    fn test_zone_fallback_chain() {
        let policies = vec![policy("A", 0.0, 1.0)];
        let matrix = RateMatrix::new(&policies);
        let config = EngineConfig::default();

        let exact = matrix.resolve(0.5, &"US".into(), &config).unwrap();
        assert_eq!(exact.zone.zone_code, "US");
        assert_eq!(exact.zone_lookup, ZoneLookup::ExactCountry);

        let aliased = matrix.resolve(0.5, &"DE".into(), &config).unwrap();
        assert_eq!(aliased.zone.zone_code, "EU");
        assert_eq!(aliased.zone_lookup, ZoneLookup::ConfiguredZone);

        let wildcard = matrix.resolve(0.5, &"BR".into(), &config).unwrap();
        assert_eq!(wildcard.zone.zone_code, DEFAULT_ZONE_CODE);
        assert_eq!(wildcard.zone_lookup, ZoneLookup::Wildcard);
    }

    #[test]
    fn test_missing_zone_fails() {
        let mut only_us = policy("A", 0.0, 1.0);
        only_us.zones.retain(|z| z.zone_code == "US");
        let policies = vec![only_us];
        let err = RateMatrix::new(&policies)
            .resolve(0.5, &"BR".into(), &EngineConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("no zone for BR"));
    }

    proptest! {
        #[test]
        fn prop_billable_never_below_actual(
            w in 0.0f64..100.0,
            l in 0.0f64..200.0,
            wd in 0.0f64..200.0,
            h in 0.0f64..200.0,
        ) {
            let weight = WeightBandResolver::default().billable_weight(w, l, wd, h);
            prop_assert!(weight.billable_kg >= w);
        }
    }
}
