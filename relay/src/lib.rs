//! Role pointer registry ("Relay").
//!
//! Holds the two mutable role pointers and lets only the current holder of a
//! role hand it to a successor. Governance engines call in here when a cycle
//! closes with quorum.

pub mod error;
pub mod registry;

pub use error::RelayError;
pub use registry::{Handover, Relay};
