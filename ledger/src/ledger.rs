//! Ledger-side interfaces consumed by the governance engines.
//!
//! The governance engine never owns balances. It reads them through
//! [`BalanceLedger`] at the moment of each vote, and the ledger asks every
//! registered [`TransferGuard`] before moving stake out of an account.

use steward_types::{Address, Amount, Height};

/// Read access to balances and the ledger clock.
pub trait BalanceLedger {
    /// Live balance of `account`; zero for unknown accounts.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Total stake in circulation, the base of every quorum threshold.
    fn circulating_supply(&self) -> Amount;

    /// Current block height.
    fn height(&self) -> Height;
}

/// Hook consulted by the ledger before executing a transfer.
///
/// Implementors return `true` when `from` has outstanding weight that a
/// transfer would invalidate.
pub trait TransferGuard {
    fn transfer_locked(&self, from: &Address, height: Height) -> bool;
}

impl<L: BalanceLedger + ?Sized> BalanceLedger for &L {
    fn balance_of(&self, account: &Address) -> Amount {
        (**self).balance_of(account)
    }

    fn circulating_supply(&self) -> Amount {
        (**self).circulating_supply()
    }

    fn height(&self) -> Height {
        (**self).height()
    }
}
