//! Fungible stake ledger.
//!
//! The governance engines treat this crate as an external collaborator: they
//! read balances through [`BalanceLedger`] and populate the [`TransferGuard`]
//! hook that the ledger consults before every transfer.

pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod token;

pub use error::LedgerError;
pub use ledger::{BalanceLedger, TransferGuard};
pub use snapshot::{AccountSnapshot, LedgerSnapshot, SNAPSHOT_VERSION};
pub use token::TokenLedger;
