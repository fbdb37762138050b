use steward_relay::RelayError;
use steward_types::{Address, ParamsError};
use thiserror::Error;

use crate::phase::Phase;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("{operation} is not allowed in the {phase} phase")]
    Phase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("candidate {0} was already submitted this cycle")]
    DuplicateCandidate(Address),

    #[error("candidate {0} was not submitted this cycle")]
    UnknownCandidate(Address),

    #[error("{0} has no stake to vote with")]
    InsufficientStake(Address),

    #[error("{0} has no active vote")]
    NoActiveVote(Address),

    #[error("there is no finalist to support this cycle")]
    NoFinalist,

    #[error("{0} has no active support ballot")]
    NoActiveSupport(Address),

    #[error("invalid cycle parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("weight overflow on {0}")]
    WeightOverflow(Address),

    #[error("tally for {0} does not cover its ballots")]
    InconsistentTally(Address),

    #[error("support total of cycle {cycle} does not cover its ballots")]
    InconsistentSupport { cycle: u64 },

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
