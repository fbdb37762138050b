//! Stake-weighted governance cycles for the Steward protocol.
//!
//! Each engine runs one role's election: Submission → Voting → Support →
//! Closeable, each window `period_length` heights long. Votes and support are
//! weighted by live ledger balances, the leading candidate is tracked
//! incrementally as the finalist, and a close with quorum hands the role
//! pointer in the relay to the finalist.
//!
//! Two engines (governance and decision module) run independent, phase-offset
//! cycles over the same ledger.

pub mod arena;
pub mod driver;
pub mod engine;
pub mod error;
pub mod phase;
pub mod snapshot;

pub use arena::{Ballot, Candidate, CycleArena, CycleOutcome, CycleRecord, SupportBallot};
pub use driver::CycleDriver;
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use phase::Phase;
pub use snapshot::{EngineSnapshot, ENGINE_SNAPSHOT_VERSION};
