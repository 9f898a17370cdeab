use landed_core::{PricingError, Usd};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEIGHT_TIERS_KG: [f64; 9] = [0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 20.0, 30.0];
pub const DEFAULT_PRICE_TIERS_USD: [f64; 7] = [30.0, 60.0, 100.0, 150.0, 200.0, 300.0, 500.0];

const PRODUCTION_WEIGHT_STEP_KG: f64 = 0.5;
const PRODUCTION_WEIGHT_STEPS: u32 = 60;
const PRODUCTION_PRICE_STEP_USD: f64 = 175.0;
const PRODUCTION_PRICE_STEPS: u32 = 20;

/// Weight and price tiers; every pair is one template cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateGrid {
    weights_kg: Vec<f64>,
    prices_usd: Vec<Usd>,
}

impl Default for TemplateGrid {
    fn default() -> Self {
        Self {
            weights_kg: DEFAULT_WEIGHT_TIERS_KG.to_vec(),
            prices_usd: DEFAULT_PRICE_TIERS_USD.iter().copied().map(Usd).collect(),
        }
    }
}

impl TemplateGrid {
    /// Tiers must be positive; price tiers divide the price difference.
    pub fn new(weights_kg: Vec<f64>, prices_usd: Vec<Usd>) -> Result<Self, PricingError> {
        if weights_kg.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(PricingError::calculation("weight tiers must be positive"));
        }
        if prices_usd.iter().any(|p| !p.is_finite() || p.value() <= 0.0) {
            return Err(PricingError::calculation("price tiers must be positive"));
        }
        Ok(Self { weights_kg, prices_usd })
    }

    /// 0.5 kg steps to 30 kg, $175 steps to $3500
    pub fn production_matrix() -> Self {
        Self {
            weights_kg: (1..=PRODUCTION_WEIGHT_STEPS)
                .map(|i| f64::from(i) * PRODUCTION_WEIGHT_STEP_KG)
                .collect(),
            prices_usd: (1..=PRODUCTION_PRICE_STEPS)
                .map(|i| Usd(f64::from(i) * PRODUCTION_PRICE_STEP_USD))
                .collect(),
        }
    }

    pub fn weights_kg(&self) -> &[f64] {
        &self.weights_kg
    }

    pub fn prices_usd(&self) -> &[Usd] {
        &self.prices_usd
    }

    /// Cells in weight-major order
    pub fn cells(&self) -> impl Iterator<Item = (f64, Usd)> + '_ {
        self.weights_kg
            .iter()
            .flat_map(move |w| self.prices_usd.iter().map(move |p| (*w, *p)))
    }

    pub fn len(&self) -> usize {
        self.weights_kg.len() * self.prices_usd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let grid = TemplateGrid::default();
        assert_eq!(grid.len(), 63);
        assert_eq!(grid.cells().next(), Some((0.5, Usd(30.0))));
    }

    #[test]
    fn test_production_matrix() {
        let grid = TemplateGrid::production_matrix();
        assert_eq!(grid.weights_kg().len(), 60);
        assert_eq!(grid.prices_usd().len(), 20);
        assert_eq!(grid.weights_kg().last(), Some(&30.0));
        assert_eq!(grid.prices_usd().last(), Some(&Usd(3500.0)));
        assert_eq!(grid.len(), 1200);
    }

    #[test]
    fn test_zero_price_tier_rejected() {
        assert!(TemplateGrid::new(vec![1.0], vec![Usd(0.0)]).is_err());
    }
}
