use steward_types::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transfer from {0} is locked by an active governance ballot")]
    TransferLocked(Address),

    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("balance overflow crediting {0}")]
    Overflow(Address),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
