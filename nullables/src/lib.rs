//! Nullable infrastructure for deterministic testing.
//!
//! External collaborators of the governance engine are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return exactly the values a test sets
//! - Can be changed between calls without going through transfer rules
//! - Never touch the filesystem or network
//!
//! Usage: pass a nullable wherever a `BalanceLedger` is expected.

pub mod ledger;

pub use ledger::NullLedger;
