use steward_types::{Address, Role};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] steward_ledger::LedgerError),

    #[error("governance error: {0}")]
    Governance(#[from] steward_governance::GovernanceError),

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("engine {engine} does not hold the {role} role")]
    Unauthorized { role: Role, engine: Address },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
