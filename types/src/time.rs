//! Ledger height, the protocol's clock.
//!
//! Governance phases are measured in heights, not wall-clock seconds, so every
//! node derives the same phase for the same block.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger block height.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Height(u64);

impl Height {
    /// Genesis height.
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Heights elapsed since `self`, or `None` if `now` is before `self`.
    pub fn elapsed_until(&self, now: Height) -> Option<u64> {
        now.0.checked_sub(self.0)
    }

    /// `self + blocks`, saturating at `u64::MAX`.
    pub fn advance(&self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
