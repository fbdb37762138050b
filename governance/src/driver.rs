//! Cycle driver: the engine's source of "now".

use steward_types::Height;

/// Supplies the current height to an engine.
///
/// Production engines follow the ledger height. Tests pin the clock with
/// [`CycleDriver::set_clock`] to hit phase boundaries exactly. Overrides are
/// not part of engine snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleDriver {
    pinned: Option<Height>,
}

impl CycleDriver {
    pub fn now(&self, ledger_height: Height) -> Height {
        self.pinned.unwrap_or(ledger_height)
    }

    pub fn set_clock(&mut self, height: Height) {
        self.pinned = Some(height);
    }

    pub fn clear_clock(&mut self) {
        self.pinned = None;
    }

    pub fn pinned(&self) -> Option<Height> {
        self.pinned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_ledger_unless_pinned() {
        let mut driver = CycleDriver::default();
        assert_eq!(driver.now(Height::new(5)), Height::new(5));
        driver.set_clock(Height::new(42));
        assert_eq!(driver.now(Height::new(5)), Height::new(42));
        driver.clear_clock();
        assert_eq!(driver.now(Height::new(6)), Height::new(6));
    }
}
