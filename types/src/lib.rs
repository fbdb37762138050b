//! Fundamental types for the Steward governance protocol.
//!
//! Shared across every crate in the workspace: addresses, stake amounts,
//! ledger heights, governed roles and cycle parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod role;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use error::{AddressError, ParamsError};
pub use params::{CycleParams, CYCLE_WINDOWS};
pub use role::Role;
pub use time::Height;
