//! Wager amounts and payout multipliers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency tag carried inside wager contexts. Opaque to outcome decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Btc,
    Tbtc,
    Eth,
}

/// A wager amount in the currency's smallest unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub currency: Currency,
    pub value: u64,
}

impl Amount {
    pub fn new(currency: Currency, value: u64) -> Self {
        Self { currency, value }
    }
}

/// A payout multiplier floored to two decimal places, stored in hundredths.
///
/// `Multiplier(250)` is `2.50x`. Integer storage keeps crash/dice results
/// bit-for-bit reproducible across platforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(u64);

impl Multiplier {
    /// `1.00x`, the smallest multiplier a crash round can produce.
    pub const ONE: Self = Self(100);

    pub fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    pub fn hundredths(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}
