//! Ledger snapshots: capture every balance at a height.
//!
//! A snapshot records the circulating supply next to the account list so a
//! restore can detect truncated or tampered account data.

use serde::{Deserialize, Serialize};

use steward_types::{Address, Amount, Height};

use crate::error::LedgerError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Height at which the snapshot was taken.
    pub height: Height,
    /// Circulating supply at that height.
    pub supply: Amount,
    pub accounts: Vec<AccountSnapshot>,
    /// Snapshot version for compatibility.
    pub version: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub balance: Amount,
}

impl LedgerSnapshot {
    pub fn create(accounts: Vec<AccountSnapshot>, supply: Amount, height: Height) -> Self {
        Self {
            height,
            supply,
            accounts,
            version: SNAPSHOT_VERSION,
        }
    }

    /// Check the version and that the account balances add up to the supply.
    pub fn verify(&self) -> Result<(), LedgerError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        let mut total = Amount::ZERO;
        for account in &self.accounts {
            total = total
                .checked_add(account.balance)
                .ok_or(LedgerError::Overflow(account.address))?;
        }
        if total != self.supply {
            return Err(LedgerError::Snapshot(format!(
                "balances sum to {total}, snapshot records supply {}",
                self.supply
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(data).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u64, balance: u128) -> AccountSnapshot {
        AccountSnapshot {
            address: Address::from_low_u64(n),
            balance: Amount::new(balance),
        }
    }

    #[test]
    fn consistent_snapshot_verifies() {
        let snap = LedgerSnapshot::create(
            vec![account(1, 10), account(2, 5)],
            Amount::new(15),
            Height::new(3),
        );
        snap.verify().unwrap();
        let decoded = LedgerSnapshot::from_bytes(&snap.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, snap);
    }

    #[test]
    fn supply_mismatch_is_rejected() {
        let snap = LedgerSnapshot::create(vec![account(1, 10)], Amount::new(11), Height::new(3));
        assert!(matches!(snap.verify(), Err(LedgerError::Snapshot(_))));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut snap = LedgerSnapshot::create(vec![], Amount::ZERO, Height::GENESIS);
        snap.version = 99;
        assert!(matches!(snap.verify(), Err(LedgerError::Snapshot(_))));
    }
}
