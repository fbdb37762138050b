//! The governor: one token ledger, one relay, one engine per role.
//!
//! Every operation borrows the ledger for the engine's balance reads and
//! hands both engines to the ledger as transfer guards, so an active ballot
//! in either cycle locks the voter's stake.

use serde::{Deserialize, Serialize};

use steward_governance::{CycleOutcome, EngineSnapshot, GovernanceEngine, Phase};
use steward_ledger::{BalanceLedger, LedgerSnapshot, TokenLedger, TransferGuard};
use steward_relay::Relay;
use steward_types::{Address, Amount, Height, Role};

use crate::config::NodeConfig;
use crate::events::{EventBus, GovernorEvent};
use crate::NodeError;

/// Current governor snapshot format version.
pub const GOVERNOR_SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorSnapshot {
    pub version: u32,
    pub ledger: LedgerSnapshot,
    pub relay: Relay,
    pub governance: EngineSnapshot,
    pub decision_module: EngineSnapshot,
}

#[derive(Debug)]
pub struct Governor {
    ledger: TokenLedger,
    relay: Relay,
    governance: GovernanceEngine,
    decision_module: GovernanceEngine,
    events: EventBus,
}

impl Governor {
    /// Assemble a governor from its parts.
    ///
    /// Each engine must be bound to the role it is installed for, and the two
    /// engines must have distinct addresses.
    pub fn new(
        ledger: TokenLedger,
        relay: Relay,
        governance: GovernanceEngine,
        decision_module: GovernanceEngine,
    ) -> Result<Self, NodeError> {
        check_binding(&governance, Role::Governance)?;
        check_binding(&decision_module, Role::DecisionModule)?;
        if governance.id() == decision_module.id() {
            return Err(NodeError::Config(format!(
                "both engines use address {}",
                governance.id()
            )));
        }
        Ok(Self {
            ledger,
            relay,
            governance,
            decision_module,
            events: EventBus::new(),
        })
    }

    /// Build the genesis state described by `config`.
    ///
    /// Each engine starts out holding its own role, with its first cycle
    /// starting `offset` blocks after genesis.
    pub fn from_config(config: &NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let genesis = config.genesis.height();
        let mut ledger = TokenLedger::new(genesis);
        for (address, amount) in config.genesis.allocations() {
            ledger.mint(&address, amount)?;
        }

        let relay = Relay::new(config.governance.engine, config.decision_module.engine);
        let engine = |role: Role| -> Result<GovernanceEngine, NodeError> {
            let cycle = config.cycle(role);
            Ok(GovernanceEngine::new(
                cycle.engine,
                role,
                cycle.params()?,
                genesis.advance(cycle.offset),
            )?)
        };
        let governor = Self::new(
            ledger,
            relay,
            engine(Role::Governance)?,
            engine(Role::DecisionModule)?,
        )?;

        tracing::info!(
            height = %genesis,
            supply = %governor.ledger.circulating_supply(),
            governance = %governor.governance.id(),
            decision_module = %governor.decision_module.id(),
            "governor initialised from config"
        );
        Ok(governor)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub fn engine(&self, role: Role) -> &GovernanceEngine {
        match role {
            Role::Governance => &self.governance,
            Role::DecisionModule => &self.decision_module,
        }
    }

    /// The engine for `role`, together with the ledger and relay it runs against.
    fn parts(&mut self, role: Role) -> (&mut GovernanceEngine, &TokenLedger, &mut Relay) {
        let engine = match role {
            Role::Governance => &mut self.governance,
            Role::DecisionModule => &mut self.decision_module,
        };
        (engine, &self.ledger, &mut self.relay)
    }

    pub fn height(&self) -> Height {
        self.ledger.height()
    }

    pub fn phase(&self, role: Role) -> Phase {
        self.engine(role).current_phase(&self.ledger)
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernorEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Ledger ─────────────────────────────────────────────────────────

    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), NodeError> {
        self.ledger.mint(to, amount)?;
        self.events.emit(&GovernorEvent::Minted { to: *to, amount });
        Ok(())
    }

    /// Move stake, unless either engine holds a live ballot from `from`.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), NodeError> {
        let guards: [&dyn TransferGuard; 2] = [&self.governance, &self.decision_module];
        self.ledger.transfer(from, to, amount, &guards)?;
        self.events.emit(&GovernorEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Whether a transfer out of `account` would be refused right now.
    pub fn transfer_locked(&self, account: &Address) -> bool {
        let height = self.ledger.height();
        self.governance.transfer_locked(account, height)
            || self.decision_module.transfer_locked(account, height)
    }

    pub fn advance(&mut self, blocks: u64) -> Height {
        let height = self.ledger.advance(blocks);
        self.events.emit(&GovernorEvent::Advanced { height });
        height
    }

    // ── Clock ──────────────────────────────────────────────────────────

    pub fn set_clock(&mut self, role: Role, height: Height) {
        tracing::debug!(%role, %height, "engine clock pinned");
        self.parts(role).0.set_clock(height);
    }

    pub fn clear_clock(&mut self, role: Role) {
        tracing::debug!(%role, "engine clock released");
        self.parts(role).0.clear_clock();
    }

    // ── Cycle operations ───────────────────────────────────────────────

    pub fn submit(&mut self, role: Role, submitter: &Address, candidate: Address) -> Result<(), NodeError> {
        let (engine, ledger, _) = self.parts(role);
        engine.submit(ledger, submitter, candidate)?;
        let cycle = engine.cycle_index();
        self.events.emit(&GovernorEvent::CandidateSubmitted {
            role,
            cycle,
            candidate,
        });
        Ok(())
    }

    pub fn choose(&mut self, role: Role, voter: &Address, candidate: &Address) -> Result<(), NodeError> {
        let (engine, ledger, _) = self.parts(role);
        engine.choose(ledger, voter, candidate)?;
        let weight = engine
            .ballot(voter)
            .map(|b| b.cast_weight)
            .unwrap_or(Amount::ZERO);
        self.events.emit(&GovernorEvent::VoteCast {
            role,
            voter: *voter,
            candidate: *candidate,
            weight,
        });
        Ok(())
    }

    pub fn decline(&mut self, role: Role, voter: &Address) -> Result<(), NodeError> {
        let (engine, ledger, _) = self.parts(role);
        engine.decline(ledger, voter)?;
        self.events
            .emit(&GovernorEvent::VoteWithdrawn { role, voter: *voter });
        Ok(())
    }

    pub fn decide(&mut self, role: Role, voter: &Address) -> Result<(), NodeError> {
        let (engine, ledger, _) = self.parts(role);
        engine.decide(ledger, voter)?;
        let weight = engine
            .support(voter)
            .map(|s| s.weight)
            .unwrap_or(Amount::ZERO);
        self.events.emit(&GovernorEvent::SupportCast {
            role,
            voter: *voter,
            weight,
        });
        Ok(())
    }

    pub fn dither(&mut self, role: Role, voter: &Address) -> Result<(), NodeError> {
        let (engine, ledger, _) = self.parts(role);
        engine.dither(ledger, voter)?;
        self.events
            .emit(&GovernorEvent::SupportWithdrawn { role, voter: *voter });
        Ok(())
    }

    /// Close the open cycle of `role`, moving the role pointer on quorum.
    pub fn close(&mut self, role: Role) -> Result<CycleOutcome, NodeError> {
        let (engine, ledger, relay) = self.parts(role);
        let handovers = relay.handovers().len();
        let outcome = engine.close(ledger, relay)?;
        let handover = relay.handovers().get(handovers).cloned();

        self.events.emit(&GovernorEvent::CycleClosed {
            role,
            outcome: outcome.clone(),
        });
        if let Some(handover) = handover {
            self.events.emit(&GovernorEvent::RoleHandedOver {
                role: handover.role,
                from: handover.from,
                to: handover.to,
            });
        }
        Ok(outcome)
    }

    /// Replace a retired engine with the role's new holder.
    ///
    /// The successor must be bound to a role and be that role's current
    /// holder in the relay. Returns the engine it replaced.
    pub fn install_engine(&mut self, engine: GovernanceEngine) -> Result<GovernanceEngine, NodeError> {
        let role = engine.role();
        if self.relay.holder(role) != engine.id() {
            tracing::warn!(%role, engine = %engine.id(), "refused to install non-holder engine");
            return Err(NodeError::Unauthorized {
                role,
                engine: engine.id(),
            });
        }
        let installed = engine.id();
        let retired = std::mem::replace(self.parts(role).0, engine);
        tracing::info!(%role, retired = %retired.id(), %installed, "engine installed");
        self.events.emit(&GovernorEvent::EngineInstalled {
            role,
            retired: retired.id(),
            installed,
        });
        Ok(retired)
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> GovernorSnapshot {
        GovernorSnapshot {
            version: GOVERNOR_SNAPSHOT_VERSION,
            ledger: self.ledger.snapshot(),
            relay: self.relay.clone(),
            governance: self.governance.snapshot(),
            decision_module: self.decision_module.snapshot(),
        }
    }

    /// Rebuild a governor from a snapshot. Subscribers and pinned clocks
    /// are not part of the snapshot.
    pub fn from_snapshot(snapshot: GovernorSnapshot) -> Result<Self, NodeError> {
        if snapshot.version != GOVERNOR_SNAPSHOT_VERSION {
            return Err(NodeError::Snapshot(format!(
                "unsupported governor snapshot version {}",
                snapshot.version
            )));
        }
        Self::new(
            TokenLedger::from_snapshot(snapshot.ledger)?,
            snapshot.relay,
            GovernanceEngine::from_snapshot(snapshot.governance)?,
            GovernanceEngine::from_snapshot(snapshot.decision_module)?,
        )
    }

    /// Serialize the whole governor state for persistence.
    pub fn save_state(&self) -> Result<Vec<u8>, NodeError> {
        bincode::serialize(&self.snapshot()).map_err(|e| NodeError::Snapshot(e.to_string()))
    }

    /// Restore a governor from [`Governor::save_state`] output.
    pub fn load_state(data: &[u8]) -> Result<Self, NodeError> {
        let snapshot: GovernorSnapshot =
            bincode::deserialize(data).map_err(|e| NodeError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }
}

fn check_binding(engine: &GovernanceEngine, role: Role) -> Result<(), NodeError> {
    if engine.role() != role {
        return Err(NodeError::Config(format!(
            "engine {} elects {} but was installed for {role}",
            engine.id(),
            engine.role()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_types::CycleParams;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn engine(id: u64, role: Role) -> GovernanceEngine {
        GovernanceEngine::new(addr(id), role, CycleParams::new(10, 50).unwrap(), Height::GENESIS)
            .unwrap()
    }

    fn governor() -> Governor {
        Governor::new(
            TokenLedger::new(Height::GENESIS),
            Relay::new(addr(1), addr(2)),
            engine(1, Role::Governance),
            engine(2, Role::DecisionModule),
        )
        .unwrap()
    }

    #[test]
    fn engines_must_match_their_slot() {
        let result = Governor::new(
            TokenLedger::new(Height::GENESIS),
            Relay::new(addr(1), addr(2)),
            engine(2, Role::DecisionModule),
            engine(1, Role::Governance),
        );
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn engines_must_have_distinct_addresses() {
        let result = Governor::new(
            TokenLedger::new(Height::GENESIS),
            Relay::new(addr(1), addr(1)),
            engine(1, Role::Governance),
            engine(1, Role::DecisionModule),
        );
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn operations_route_to_the_role_engine() {
        let mut gov = governor();
        gov.mint(&addr(10), Amount::new(40)).unwrap();
        gov.submit(Role::DecisionModule, &addr(10), addr(77)).unwrap();

        assert!(gov.engine(Role::Governance).candidates().is_empty());
        assert_eq!(
            gov.engine(Role::DecisionModule).candidate_weight(&addr(77)),
            Some(Amount::ONE)
        );
    }

    #[test]
    fn pinned_clock_affects_only_its_engine() {
        let mut gov = governor();
        gov.set_clock(Role::Governance, Height::new(10));
        assert_eq!(gov.phase(Role::Governance), Phase::Voting);
        assert_eq!(gov.phase(Role::DecisionModule), Phase::Submission);
        gov.clear_clock(Role::Governance);
        assert_eq!(gov.phase(Role::Governance), Phase::Submission);
    }

    #[test]
    fn install_engine_requires_the_role_holder() {
        let mut gov = governor();
        let successor = engine(3, Role::Governance);
        assert!(matches!(
            gov.install_engine(successor),
            Err(NodeError::Unauthorized { role: Role::Governance, .. })
        ));
        assert_eq!(gov.engine(Role::Governance).id(), addr(1));
    }

    #[test]
    fn unsupported_snapshot_version_is_rejected() {
        let gov = governor();
        let mut snapshot = gov.snapshot();
        snapshot.version = 9;
        assert!(matches!(
            Governor::from_snapshot(snapshot),
            Err(NodeError::Snapshot(_))
        ));
    }

    #[test]
    fn garbage_state_is_rejected() {
        assert!(matches!(
            Governor::load_state(b"not a snapshot"),
            Err(NodeError::Snapshot(_))
        ));
    }
}
