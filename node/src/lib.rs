//! Steward node: one ledger, one relay and the two engines that elect its roles.
//!
//! The node is the central coordinator that:
//! - Applies stake transfers, refusing those locked by an active ballot
//! - Routes submissions, votes and support to the engine for a role
//! - Closes cycles and hands roles over through the relay
//! - Persists and restores the whole state
//! - Replays scripted steps for inspection and testing

pub mod config;
pub mod error;
pub mod events;
pub mod governor;
pub mod logging;
pub mod replay;

pub use config::{CycleConfig, GenesisBalance, GenesisConfig, NodeConfig};
pub use error::NodeError;
pub use events::{EventBus, GovernorEvent};
pub use governor::{Governor, GovernorSnapshot, GOVERNOR_SNAPSHOT_VERSION};
pub use logging::{init_logging, LogFormat};
pub use replay::{parse_script, Step, StepOutput};
