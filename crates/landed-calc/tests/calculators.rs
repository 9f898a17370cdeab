//! Calculators working together on one product, without the pipeline

use landed_calc::{
    CostBasis, CurrencyConverter, DutyCalculator, FeeCalculator, ProfitabilityEvaluator,
    RateMatrix, WeightBandResolver,
};
use landed_core::{
    CategoryFeeSchedule, Condition, DutyMode, EngineConfig, ExchangeRate, FeeScheduleTable,
    HsCodeRecord, HsCodeTable, Jpy, PricingRequest, ShippingPolicy, StoreType, Usd, ZoneRate,
};

fn request(price: Option<f64>) -> PricingRequest {
    PricingRequest {
        cost_jpy: Jpy(3000.0),
        actual_weight_kg: 0.4,
        length_cm: 10.0,
        width_cm: 10.0,
        height_cm: 5.0,
        origin_country: "JP".into(),
        destination_country: "US".into(),
        hs_code: "9504.40".to_string(),
        store_type: StoreType::None,
        refundable_fees_jpy: Jpy::ZERO,
        category: "Toys".to_string(),
        marketplace: "ebay_us".to_string(),
        condition: Condition::New,
        selling_price_usd: price.map(Usd),
    }
}

fn policies() -> Vec<ShippingPolicy> {
    vec![ShippingPolicy {
        id: "small-packet".to_string(),
        name: "Small Packet".to_string(),
        weight_min_kg: 0.3,
        weight_max_kg: 0.6,
        price_usd: Usd(15.0),
        zones: vec![ZoneRate {
            zone_code: "US".to_string(),
            display_shipping_usd: Usd(15.0),
            actual_cost_usd: Usd(15.0),
            handling_fee_ddp_usd: Usd::ZERO,
            handling_fee_ddu_usd: Usd::ZERO,
        }],
    }]
}

#[test]
fn fee_cap_applies_at_high_price() {
    let fees = FeeScheduleTable::new().with(
        "Toys",
        CategoryFeeSchedule {
            fvf: 0.13,
            cap: Some(Usd(50.0)),
            insertion_fee: Usd::ZERO,
        },
    );
    let config = EngineConfig::default();
    let terms = FeeCalculator::new(&fees, &config).terms(&request(Some(1000.0))).unwrap();
    let quote = terms.quote(Usd(1000.0));
    // 1000 * 0.13 = 130, capped
    assert_eq!(quote.final_value_fee, Usd(50.0));
    assert!(quote.capped);
}

#[test]
fn full_calculation_by_hand() {
    let config = EngineConfig::default();
    let req = request(Some(80.0));
    let policies = policies();
    let fees = FeeScheduleTable::new().with(
        "Toys",
        CategoryFeeSchedule {
            fvf: 0.13,
            cap: None,
            insertion_fee: Usd(0.35),
        },
    );
    let hs = HsCodeTable::from(vec![HsCodeRecord {
        code: "9504.40".to_string(),
        general_rate: 0.0,
        special_rate: None,
        additional_duties: None,
        description: None,
    }]);
    let fx = CurrencyConverter::new(ExchangeRate::new(150.0, 2.0));

    let weight = WeightBandResolver::from_config(&config).for_request(&req);
    assert_eq!(weight.billable_kg, 0.4);

    let matched = RateMatrix::new(&policies)
        .resolve(weight.billable_kg, &req.destination_country, &config)
        .unwrap();
    let cost_usd = fx.jpy_to_usd_safe(req.cost_jpy);
    let duty = DutyCalculator::new(&hs, &config)
        .quote(&req, cost_usd, matched.zone.actual_cost_usd)
        .unwrap();
    let terms = FeeCalculator::new(&fees, &config).terms(&req).unwrap();
    let basis = CostBasis::new(cost_usd, &matched.zone, duty.duty_usd);

    let ddu = ProfitabilityEvaluator::new(fx)
        .scenario(DutyMode::Ddu, Usd(80.0), &basis, &terms, req.refundable_fees_jpy)
        .unwrap();

    // 3000/148 + 15 + 80*0.13 + 0.35 = 46.02027027...
    assert!((ddu.landed_cost_usd.value() - 46.020_270_270).abs() < 1e-6);
    assert!((ddu.profit_usd.value() - 33.979_729_730).abs() < 1e-6);
    assert!((ddu.margin - 0.424_746_622).abs() < 1e-6);
}
