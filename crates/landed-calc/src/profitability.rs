//! Scenario profit and price suggestion
use crate::currency::CurrencyConverter;
use crate::fees::FeeTerms;
use landed_core::{CustomsCharges, DutyMode, Jpy, PricingError, ScenarioResult, Usd, ZoneRate};
use serde::{Deserialize, Serialize};

/// Price-independent costs of delivering one unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBasis {
    /// Product cost at the safe rate
    pub cost_usd: Usd,
    pub shipping_cost_usd: Usd,
    pub handling_ddp_usd: Usd,
    pub handling_ddu_usd: Usd,
    /// Duty quoted for the product; only DDP bears it
    pub duty_usd: Usd,
    /// Processing fee share of the price; only DDP bears it
    pub mpf_rate: f64,
    /// Only DDP bears it
    pub brokerage_fee_usd: Usd,
}

impl CostBasis {
    pub fn new(cost_usd: Usd, zone: &ZoneRate, duty_usd: Usd) -> Self {
        Self {
            cost_usd,
            shipping_cost_usd: zone.actual_cost_usd,
            handling_ddp_usd: zone.handling_fee(DutyMode::Ddp),
            handling_ddu_usd: zone.handling_fee(DutyMode::Ddu),
            duty_usd,
            mpf_rate: 0.0,
            brokerage_fee_usd: Usd::ZERO,
        }
    }

    pub fn with_customs(mut self, charges: CustomsCharges) -> Self {
        self.mpf_rate = charges.mpf_rate;
        self.brokerage_fee_usd = charges.brokerage_fee_usd;
        self
    }

    pub fn handling(&self, mode: DutyMode) -> Usd {
        match mode {
            DutyMode::Ddp => self.handling_ddp_usd,
            DutyMode::Ddu => self.handling_ddu_usd,
        }
    }

    pub fn duty(&self, mode: DutyMode) -> Usd {
        match mode {
            DutyMode::Ddp => self.duty_usd,
            DutyMode::Ddu => Usd::ZERO,
        }
    }

    fn mpf_rate(&self, mode: DutyMode) -> f64 {
        match mode {
            DutyMode::Ddp => self.mpf_rate,
            DutyMode::Ddu => 0.0,
        }
    }

    /// Processing fee at `selling_price` plus brokerage
    pub fn customs_fees(&self, mode: DutyMode, selling_price: Usd) -> Usd {
        match mode {
            DutyMode::Ddp => selling_price * self.mpf_rate + self.brokerage_fee_usd,
            DutyMode::Ddu => Usd::ZERO,
        }
    }

    /// Everything that does not scale with the price
    pub fn fixed_costs(&self, mode: DutyMode) -> Usd {
        let brokerage = match mode {
            DutyMode::Ddp => self.brokerage_fee_usd,
            DutyMode::Ddu => Usd::ZERO,
        };
        self.cost_usd + self.shipping_cost_usd + self.handling(mode) + self.duty(mode) + brokerage
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProfitabilityEvaluator {
    fx: CurrencyConverter,
}

impl ProfitabilityEvaluator {
    pub fn new(fx: CurrencyConverter) -> Self {
        Self { fx }
    }

    pub fn scenario(
        &self,
        mode: DutyMode,
        selling_price: Usd,
        basis: &CostBasis,
        terms: &FeeTerms,
        refundable_fees: Jpy,
    ) -> Result<ScenarioResult, PricingError> {
        let fees = terms.quote(selling_price);
        let marketplace_fee = fees.marketplace_fee();
        let customs_fees = basis.customs_fees(mode, selling_price);
        let landed_cost = basis.cost_usd
            + basis.shipping_cost_usd
            + basis.handling(mode)
            + basis.duty(mode)
            + customs_fees
            + marketplace_fee
            + fees.payment_fee;
        let profit = selling_price - landed_cost;
        let margin = if selling_price == Usd::ZERO {
            0.0
        } else {
            profit.value() / selling_price.value()
        };
        let profit_jpy = self.fx.usd_to_jpy_spot(profit);

        if !landed_cost.is_finite() || !margin.is_finite() || !profit_jpy.is_finite() {
            return Err(PricingError::calculation(format!(
                "{} scenario produced a non-finite figure (landed {}, margin {})",
                mode, landed_cost, margin
            )));
        }

        Ok(ScenarioResult {
            mode,
            selling_price_usd: selling_price,
            cost_usd: basis.cost_usd,
            shipping_cost_usd: basis.shipping_cost_usd,
            handling_fee_usd: basis.handling(mode),
            marketplace_fee_usd: marketplace_fee,
            payment_fee_usd: fees.payment_fee,
            duty_usd: basis.duty(mode),
            customs_fees_usd: customs_fees,
            landed_cost_usd: landed_cost,
            profit_usd: profit,
            margin,
            profit_jpy,
            profit_jpy_with_refund: profit_jpy + refundable_fees,
        })
    }

    /// Price at which DDP earns exactly `target_margin`.
    ///
    /// Solved in closed form for the uncapped fee; if that price would push
    /// the fee past the cap, solved again with the cap as a flat cost.
    pub fn suggest_price(
        &self,
        basis: &CostBasis,
        terms: &FeeTerms,
        target_margin: f64,
    ) -> Result<Usd, PricingError> {
        let costs = basis.fixed_costs(DutyMode::Ddp) + terms.insertion_fee + terms.payment_fixed();
        let rate = terms.payment_rate() + basis.mpf_rate(DutyMode::Ddp);

        let uncapped = solve(costs, terms.fvf_rate + rate + target_margin)?;
        let price = match terms.cap {
            Some(cap) if uncapped * terms.fvf_rate > cap => solve(costs + cap, rate + target_margin)?,
            _ => uncapped,
        };

        tracing::trace!(price = %price, target_margin, "price suggested");
        Ok(price)
    }
}

/// `costs / (1 - share)`, where `share` is the price fraction already spoken for
fn solve(costs: Usd, share: f64) -> Result<Usd, PricingError> {
    let denominator = 1.0 - share;
    if denominator.is_nan() || denominator <= 0.0 {
        return Err(PricingError::calculation(format!(
            "fees and margin take {:.4} of the price; no price can cover costs",
            share
        )));
    }
    let price = Usd(costs.value() / denominator);
    if !price.is_finite() {
        return Err(PricingError::calculation("suggested price is not finite"));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::{ExchangeRate, PaymentGateway};
    use proptest::prelude::*;

    fn evaluator() -> ProfitabilityEvaluator {
        ProfitabilityEvaluator::new(CurrencyConverter::new(ExchangeRate::new(150.0, 2.0)))
    }

    fn basis(cost: f64, duty: f64) -> CostBasis {
        CostBasis {
            cost_usd: Usd(cost),
            shipping_cost_usd: Usd(15.0),
            handling_ddp_usd: Usd(2.0),
            handling_ddu_usd: Usd::ZERO,
            duty_usd: Usd(duty),
            mpf_rate: 0.0,
            brokerage_fee_usd: Usd::ZERO,
        }
    }

    fn us_entry(b: CostBasis) -> CostBasis {
        b.with_customs(CustomsCharges::us_formal_entry())
    }

    fn terms(cap: Option<f64>, gateway: Option<PaymentGateway>) -> FeeTerms {
        FeeTerms {
            category: "Toys".to_string(),
            fvf_rate: 0.13,
            cap: cap.map(Usd),
            insertion_fee: Usd(0.35),
            gateway,
        }
    }

    #[test]
    fn test_ddu_excludes_duty_and_ddp_handling() {
        let e = evaluator();
        let b = basis(20.0, 1.75);
        let t = terms(None, None);
        let ddp = e.scenario(DutyMode::Ddp, Usd(100.0), &b, &t, Jpy::ZERO).unwrap();
        let ddu = e.scenario(DutyMode::Ddu, Usd(100.0), &b, &t, Jpy::ZERO).unwrap();

        // 20 + 15 + 2 + 13 + 0.35 + 1.75
        assert!((ddp.landed_cost_usd.value() - 52.1).abs() < 1e-9);
        // 20 + 15 + 13 + 0.35
        assert!((ddu.landed_cost_usd.value() - 48.35).abs() < 1e-9);
        assert_eq!(ddu.duty_usd, Usd::ZERO);
        assert!((ddp.profit_jpy.value() - 47.9 * 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_customs_fees_fall_on_ddp_only() {
        let e = evaluator();
        let b = us_entry(basis(20.0, 1.75));
        let t = terms(None, None);
        let ddp = e.scenario(DutyMode::Ddp, Usd(100.0), &b, &t, Jpy::ZERO).unwrap();
        let ddu = e.scenario(DutyMode::Ddu, Usd(100.0), &b, &t, Jpy::ZERO).unwrap();

        // 100 * 0.003464 + 15
        assert!((ddp.customs_fees_usd.value() - 15.3464).abs() < 1e-9);
        assert!((ddp.landed_cost_usd.value() - (52.1 + 15.3464)).abs() < 1e-9);
        assert_eq!(ddu.customs_fees_usd, Usd::ZERO);
        assert!((ddu.landed_cost_usd.value() - 48.35).abs() < 1e-9);
    }

    #[test]
    fn test_suggested_price_covers_customs_fees() {
        let e = evaluator();
        let b = us_entry(basis(20.0, 1.75));
        let t = terms(Some(50.0), None);
        let price = e.suggest_price(&b, &t, 0.15).unwrap();
        let ddp = e.scenario(DutyMode::Ddp, price, &b, &t, Jpy::ZERO).unwrap();
        assert!((ddp.margin - 0.15).abs() < 1e-9);
        assert!(price > e.suggest_price(&basis(20.0, 1.75), &t, 0.15).unwrap());
    }

    #[test]
    fn test_zero_price_has_zero_margin() {
        let s = evaluator()
            .scenario(DutyMode::Ddu, Usd::ZERO, &basis(20.0, 0.0), &terms(None, None), Jpy::ZERO)
            .unwrap();
        assert_eq!(s.margin, 0.0);
        assert!(s.profit_usd.is_negative());
    }

    #[test]
    fn test_refund_added_to_yen_profit() {
        let s = evaluator()
            .scenario(DutyMode::Ddu, Usd(100.0), &basis(20.0, 0.0), &terms(None, None), Jpy(500.0))
            .unwrap();
        assert!((s.profit_jpy_with_refund.value() - s.profit_jpy.value() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_suggested_price_hits_target_margin() {
        let e = evaluator();
        let b = basis(20.0, 1.75);
        let gateway = PaymentGateway {
            rate: 0.0349,
            fixed: Usd(0.49),
        };
        let t = terms(None, Some(gateway));
        let price = e.suggest_price(&b, &t, 0.15).unwrap();
        let ddp = e.scenario(DutyMode::Ddp, price, &b, &t, Jpy::ZERO).unwrap();
        assert!((ddp.margin - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_suggested_price_with_cap() {
        let e = evaluator();
        let b = basis(900.0, 0.0);
        let t = terms(Some(50.0), None);
        let price = e.suggest_price(&b, &t, 0.15).unwrap();
        let ddp = e.scenario(DutyMode::Ddp, price, &b, &t, Jpy::ZERO).unwrap();
        assert!((ddp.marketplace_fee_usd.value() - 50.35).abs() < 1e-9);
        assert!((ddp.margin - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_impossible_margin_rejected() {
        let err = evaluator()
            .suggest_price(&basis(20.0, 0.0), &terms(None, None), 0.9)
            .unwrap_err();
        assert!(matches!(err, PricingError::CalculationError(_)));
    }

    proptest! {
        #[test]
        fn prop_profit_falls_as_cost_rises(
            cost in 0.0f64..5_000.0,
            extra in 1.0f64..50_000.0,
            price in 1.0f64..10_000.0,
        ) {
            let e = evaluator();
            let t = terms(Some(50.0), None);
            for mode in [DutyMode::Ddp, DutyMode::Ddu] {
                let low = e.scenario(mode, Usd(price), &us_entry(basis(cost, 1.0)), &t, Jpy::ZERO).unwrap();
                let high = e.scenario(mode, Usd(price), &us_entry(basis(cost + extra, 1.0)), &t, Jpy::ZERO).unwrap();
                prop_assert!(high.profit_usd < low.profit_usd);
                prop_assert!(high.margin < low.margin);
            }
        }
    }
}
