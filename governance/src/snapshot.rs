//! Engine persistence.
//!
//! The persisted layout is the role tag, configuration, the open cycle record
//! and the arena of every cycle so far. Clock overrides are never persisted.

use serde::{Deserialize, Serialize};
use steward_types::{Address, CycleParams, Role};

use crate::arena::{CycleArena, CycleRecord};
use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;

/// Current engine snapshot format version.
pub const ENGINE_SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u32,
    pub id: Address,
    pub role: Role,
    pub params: CycleParams,
    pub open: CycleRecord,
    pub arena: CycleArena,
}

impl GovernanceEngine {
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            version: ENGINE_SNAPSHOT_VERSION,
            id: self.id(),
            role: self.role(),
            params: *self.params(),
            open: self.open_record().clone(),
            arena: self.arena().clone(),
        }
    }

    pub fn from_snapshot(snapshot: EngineSnapshot) -> Result<Self, GovernanceError> {
        if snapshot.version != ENGINE_SNAPSHOT_VERSION {
            return Err(GovernanceError::Snapshot(format!(
                "unsupported engine snapshot version {}",
                snapshot.version
            )));
        }
        snapshot.params.validate()?;
        if snapshot.open.outcome.is_some() {
            return Err(GovernanceError::Snapshot(format!(
                "open cycle {} already has an outcome",
                snapshot.open.index
            )));
        }
        if snapshot.arena.closed_record(snapshot.open.index).is_some() {
            return Err(GovernanceError::Snapshot(format!(
                "cycle {} is both open and closed",
                snapshot.open.index
            )));
        }
        Ok(Self::from_parts(
            snapshot.id,
            snapshot.role,
            snapshot.params,
            snapshot.open,
            snapshot.arena,
        ))
    }

    /// Serialize the engine for persistence.
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(&self.snapshot()).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Restore an engine from [`GovernanceEngine::save_state`] output.
    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        let snapshot: EngineSnapshot =
            bincode::deserialize(data).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_nullables::NullLedger;
    use steward_relay::Relay;
    use steward_types::{Amount, Height};

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn restored_engine_continues_the_cycle() {
        let ledger = NullLedger::new().with_balance(addr(10), 100);
        let mut engine = GovernanceEngine::new(
            addr(1000),
            Role::DecisionModule,
            CycleParams::new(10, 50).unwrap(),
            Height::GENESIS,
        )
        .unwrap();
        let mut relay = Relay::new(addr(2000), addr(1000));
        engine.submit(&ledger, &addr(10), addr(1)).unwrap();
        ledger.set_height(30);
        engine.close(&ledger, &mut relay).unwrap();
        engine.submit(&ledger, &addr(10), addr(2)).unwrap();
        ledger.set_height(40);
        engine.choose(&ledger, &addr(10), &addr(2)).unwrap();

        let bytes = engine.save_state().unwrap();
        let mut restored = GovernanceEngine::load_state(&bytes).unwrap();
        assert_eq!(restored.snapshot(), engine.snapshot());
        assert_eq!(restored.cycle_index(), 1);
        assert_eq!(restored.role(), Role::DecisionModule);
        assert_eq!(restored.candidate_weight(&addr(2)), Some(Amount::new(101)));
        assert_eq!(restored.candidate_weight_at(0, &addr(1)), Some(Amount::ONE));

        restored.decline(&ledger, &addr(10)).unwrap();
        assert_eq!(restored.candidate_weight(&addr(2)), Some(Amount::ONE));
    }

    #[test]
    fn pinned_clock_is_not_persisted() {
        let ledger = NullLedger::new();
        let mut engine = GovernanceEngine::new(
            addr(1000),
            Role::Governance,
            CycleParams::default(),
            Height::GENESIS,
        )
        .unwrap();
        engine.set_clock(Height::new(150));
        let restored = GovernanceEngine::load_state(&engine.save_state().unwrap()).unwrap();
        assert_eq!(restored.now(&ledger), Height::GENESIS);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            GovernanceEngine::load_state(&[1, 2, 3]),
            Err(GovernanceError::Snapshot(_))
        ));
    }

    #[test]
    fn inconsistent_snapshot_is_rejected() {
        let engine = GovernanceEngine::new(
            addr(1000),
            Role::Governance,
            CycleParams::default(),
            Height::GENESIS,
        )
        .unwrap();
        let mut snapshot = engine.snapshot();
        snapshot.version = 7;
        assert!(GovernanceEngine::from_snapshot(snapshot).is_err());

        let mut snapshot = engine.snapshot();
        snapshot.params.quorum_percent = 200;
        assert!(matches!(
            GovernanceEngine::from_snapshot(snapshot),
            Err(GovernanceError::InvalidParams(_))
        ));
    }
}
