//! JPY/USD conversion
//!
//! Two rates, two purposes. The safe rate (spot moved by the buffer) turns
//! yen costs into dollars wherever the result feeds a cost or duty figure;
//! the spot rate turns dollar profit back into yen for reporting. Swapping
//! them either hides rate risk in costs or misstates realised profit.

use landed_core::{ExchangeRate, Jpy, Usd};

#[derive(Debug, Clone, Copy)]
pub struct CurrencyConverter {
    rate: ExchangeRate,
}

impl CurrencyConverter {
    pub fn new(rate: ExchangeRate) -> Self {
        Self { rate }
    }

    /// Cost-side conversion. Overstates dollars relative to spot.
    pub fn jpy_to_usd_safe(&self, amount: Jpy) -> Usd {
        Usd(amount.value() / self.rate.safe())
    }

    /// Reference conversion at spot
    pub fn jpy_to_usd_spot(&self, amount: Jpy) -> Usd {
        Usd(amount.value() / self.rate.spot)
    }

    /// Reporting conversion for profit
    pub fn usd_to_jpy_spot(&self, amount: Usd) -> Jpy {
        Jpy(amount.value() * self.rate.spot)
    }

    pub fn rate(&self) -> &ExchangeRate {
        &self.rate
    }
}
