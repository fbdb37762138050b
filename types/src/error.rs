//! Errors raised while constructing core types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("address must have 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("period length must be greater than zero")]
    ZeroPeriod,

    #[error("period length {0} overflows the cycle length")]
    PeriodTooLong(u64),

    #[error("quorum percent must be between 0 and 100, got {0}")]
    QuorumOutOfRange(u8),
}
