//! Per-engine cycle parameters.
//!
//! Fixed at engine construction. A cycle is four equal windows of
//! `period_length` heights: submission, voting, support, closeable.

use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Number of equal-length windows in a cycle.
pub const CYCLE_WINDOWS: u64 = 4;

/// Timing and quorum settings for one governance cycle engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleParams {
    /// Length of each phase window, in heights.
    pub period_length: u64,

    /// Share of the circulating supply (0–100) that must support the finalist
    /// before the role pointer moves.
    pub quorum_percent: u8,
}

impl CycleParams {
    /// Validated constructor.
    pub fn new(period_length: u64, quorum_percent: u8) -> Result<Self, ParamsError> {
        let params = Self {
            period_length,
            quorum_percent,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.period_length == 0 {
            return Err(ParamsError::ZeroPeriod);
        }
        if self.period_length.checked_mul(CYCLE_WINDOWS).is_none() {
            return Err(ParamsError::PeriodTooLong(self.period_length));
        }
        if self.quorum_percent > 100 {
            return Err(ParamsError::QuorumOutOfRange(self.quorum_percent));
        }
        Ok(())
    }

    /// Full cycle length (all four windows).
    pub fn cycle_length(&self) -> u64 {
        self.period_length.saturating_mul(CYCLE_WINDOWS)
    }
}

impl Default for CycleParams {
    fn default() -> Self {
        Self {
            period_length: 100,
            quorum_percent: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_period() {
        assert!(matches!(CycleParams::new(0, 10), Err(ParamsError::ZeroPeriod)));
    }

    #[test]
    fn rejects_quorum_over_100() {
        assert!(matches!(
            CycleParams::new(10, 101),
            Err(ParamsError::QuorumOutOfRange(101))
        ));
    }

    #[test]
    fn rejects_overflowing_period() {
        assert!(matches!(
            CycleParams::new(u64::MAX, 10),
            Err(ParamsError::PeriodTooLong(_))
        ));
    }

    #[test]
    fn default_is_valid() {
        let params = CycleParams::default();
        params.validate().unwrap();
        assert_eq!(params.cycle_length(), 400);
    }
}
