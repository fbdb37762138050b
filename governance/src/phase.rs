//! Cycle phases, derived from elapsed height.
//!
//! A phase is never stored. It is recomputed from the cycle's reference height
//! and the current height on every call, so phase transitions need no
//! scheduler and the transfer lock lifts by itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use steward_types::{CycleParams, Height};

/// Where a cycle stands, keyed by `t = now - started_at` and window `W`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// `now` is before the cycle's reference height (phase-offset engine).
    Idle,
    /// `0 ≤ t < W`: candidates may be submitted.
    Submission,
    /// `W ≤ t < 2W`: stake-weighted votes for candidates.
    Voting,
    /// `2W ≤ t < 3W`: stake-weighted support for the frozen finalist.
    Support,
    /// `3W ≤ t < 4W`: the cycle may be closed.
    Closeable,
    /// `t ≥ 4W`: past due; only `close` is accepted.
    Overdue,
}

impl Phase {
    pub fn at(started_at: Height, now: Height, params: &CycleParams) -> Self {
        let Some(elapsed) = started_at.elapsed_until(now) else {
            return Self::Idle;
        };
        match elapsed / params.period_length {
            0 => Self::Submission,
            1 => Self::Voting,
            2 => Self::Support,
            3 => Self::Closeable,
            _ => Self::Overdue,
        }
    }

    /// Whether `close` is accepted in this phase.
    pub fn can_close(&self) -> bool {
        matches!(self, Self::Closeable | Self::Overdue)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submission => "submission",
            Self::Voting => "voting",
            Self::Support => "support",
            Self::Closeable => "closeable",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
