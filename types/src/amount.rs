//! Stake amounts.
//!
//! Amounts are fixed-point integers (u128) in the ledger's smallest unit.
//! Vote weights, support aggregates and the circulating supply all use this type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A quantity of the fungible stake token, in raw units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Floor weight every candidate starts with.
    pub const ONE: Self = Self(1);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `self × percent / 100`, rounded down, exact over the whole u128 range.
    ///
    /// Splits `self` into whole hundreds and a remainder so no intermediate
    /// product can overflow for `percent ≤ 100`. Larger percentages saturate.
    pub fn percent(self, percent: u8) -> Self {
        let p = u128::from(percent);
        let whole = (self.0 / 100).saturating_mul(p);
        let rest = (self.0 % 100) * p / 100;
        Self(whole.saturating_add(rest))
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Self(u128::from(raw))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
