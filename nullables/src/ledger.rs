//! Nullable ledger: settable balances and height for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use steward_ledger::BalanceLedger;
use steward_types::{Address, Amount, Height};

/// An in-memory [`BalanceLedger`] whose state tests set directly.
///
/// Balances change without transfer rules, which is how tests simulate stake
/// moving between votes. The circulating supply is the sum of all balances
/// unless pinned with [`NullLedger::set_supply`].
pub struct NullLedger {
    balances: Mutex<HashMap<Address, Amount>>,
    supply: Mutex<Option<Amount>>,
    height: Mutex<Height>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            supply: Mutex::new(None),
            height: Mutex::new(Height::GENESIS),
        }
    }

    /// Builder form of [`NullLedger::set_balance`].
    pub fn with_balance(self, account: Address, raw: u128) -> Self {
        self.set_balance(account, raw);
        self
    }

    pub fn set_balance(&self, account: Address, raw: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert(account, Amount::new(raw));
    }

    /// Pin the circulating supply instead of summing balances.
    pub fn set_supply(&self, raw: u128) {
        *self.supply.lock().unwrap() = Some(Amount::new(raw));
    }

    pub fn set_height(&self, height: u64) {
        *self.height.lock().unwrap() = Height::new(height);
    }

    /// Advance the height by `blocks`.
    pub fn advance(&self, blocks: u64) {
        let mut height = self.height.lock().unwrap();
        *height = height.advance(blocks);
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceLedger for NullLedger {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn circulating_supply(&self) -> Amount {
        if let Some(pinned) = *self.supply.lock().unwrap() {
            return pinned;
        }
        self.balances
            .lock()
            .unwrap()
            .values()
            .fold(Amount::ZERO, |total, b| total.checked_add(*b).unwrap_or(total))
    }

    fn height(&self) -> Height {
        *self.height.lock().unwrap()
    }
}
