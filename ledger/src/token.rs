//! In-memory fungible stake ledger.
//!
//! Balances live in an ordered map so snapshots and iteration are
//! deterministic across nodes. Transfers consult every registered
//! [`TransferGuard`] before any balance moves.

use std::collections::BTreeMap;

use steward_types::{Address, Amount, Height};

use crate::error::LedgerError;
use crate::ledger::{BalanceLedger, TransferGuard};
use crate::snapshot::{AccountSnapshot, LedgerSnapshot};

#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    balances: BTreeMap<Address, Amount>,
    supply: Amount,
    height: Height,
}

impl TokenLedger {
    pub fn new(height: Height) -> Self {
        Self {
            balances: BTreeMap::new(),
            supply: Amount::ZERO,
            height,
        }
    }

    /// Create new stake in `to`. Used for genesis allocations.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        let supply = self
            .supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;
        self.supply = supply;
        self.balances.insert(*to, balance);
        tracing::debug!(account = %to, %amount, %supply, "minted stake");
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Rejected with [`LedgerError::TransferLocked`] if any guard reports
    /// `from` as locked at the current height, before the balance is checked.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        guards: &[&dyn TransferGuard],
    ) -> Result<(), LedgerError> {
        if guards.iter().any(|g| g.transfer_locked(from, self.height)) {
            tracing::debug!(account = %from, height = %self.height, "transfer refused: locked");
            return Err(LedgerError::TransferLocked(*from));
        }

        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: *from,
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        if remaining.is_zero() {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, remaining);
        }
        self.balances.insert(*to, credited);
        tracing::debug!(%from, %to, %amount, "transfer applied");
        Ok(())
    }

    /// Produce `blocks` empty blocks, returning the new height.
    pub fn advance(&mut self, blocks: u64) -> Height {
        self.height = self.height.advance(blocks);
        self.height
    }

    /// Accounts holding a nonzero balance, in address order.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::create(
            self.balances
                .iter()
                .map(|(address, balance)| AccountSnapshot {
                    address: *address,
                    balance: *balance,
                })
                .collect(),
            self.supply,
            self.height,
        )
    }

    /// Rebuild a ledger from a snapshot after checking its integrity.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        snapshot.verify()?;
        let balances = snapshot
            .accounts
            .into_iter()
            .filter(|a| !a.balance.is_zero())
            .map(|a| (a.address, a.balance))
            .collect();
        Ok(Self {
            balances,
            supply: snapshot.supply,
            height: snapshot.height,
        })
    }
}

impl BalanceLedger for TokenLedger {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    fn circulating_supply(&self) -> Amount {
        self.supply
    }

    fn height(&self) -> Height {
        self.height
    }
}
