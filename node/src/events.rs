//! Events emitted by the [`Governor`](crate::Governor) for subscribers.

use steward_governance::CycleOutcome;
use steward_types::{Address, Amount, Height, Role};

/// Governance-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernorEvent {
    /// A candidate entered the open cycle of a role's engine.
    CandidateSubmitted {
        role: Role,
        cycle: u64,
        candidate: Address,
    },
    /// A voter's stake now backs `candidate`.
    VoteCast {
        role: Role,
        voter: Address,
        candidate: Address,
        weight: Amount,
    },
    /// A voter withdrew their vote.
    VoteWithdrawn { role: Role, voter: Address },
    /// A voter's stake now supports the finalist.
    SupportCast {
        role: Role,
        voter: Address,
        weight: Amount,
    },
    /// A voter withdrew their support.
    SupportWithdrawn { role: Role, voter: Address },
    /// A cycle was closed, with or without quorum.
    CycleClosed { role: Role, outcome: CycleOutcome },
    /// The relay pointer for a role moved.
    RoleHandedOver {
        role: Role,
        from: Address,
        to: Address,
    },
    /// A successor engine took over a role.
    EngineInstalled {
        role: Role,
        retired: Address,
        installed: Address,
    },
    /// Stake moved between accounts.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// New stake was minted.
    Minted { to: Address, amount: Amount },
    /// The ledger produced blocks.
    Advanced { height: Height },
}

/// Synchronous fan-out event bus for governor events.
///
/// Listeners are invoked inline on the emitting thread, after the
/// operation has committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernorEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernorEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernorEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&GovernorEvent::Minted {
            to: addr(1),
            amount: Amount::new(5),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&GovernorEvent::VoteWithdrawn {
            role: Role::Governance,
            voter: addr(1),
        });
    }

    #[test]
    fn listener_receives_correct_event_variant() {
        let saw_vote = Arc::new(AtomicUsize::new(0));
        let saw_handover = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let sv = Arc::clone(&saw_vote);
        let sh = Arc::clone(&saw_handover);
        bus.subscribe(Box::new(move |event| match event {
            GovernorEvent::VoteCast { .. } => {
                sv.fetch_add(1, Ordering::SeqCst);
            }
            GovernorEvent::RoleHandedOver { .. } => {
                sh.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }));

        bus.emit(&GovernorEvent::VoteCast {
            role: Role::Governance,
            voter: addr(1),
            candidate: addr(2),
            weight: Amount::new(50),
        });
        bus.emit(&GovernorEvent::RoleHandedOver {
            role: Role::DecisionModule,
            from: addr(3),
            to: addr(2),
        });
        bus.emit(&GovernorEvent::Advanced {
            height: Height::new(4),
        });

        assert_eq!(saw_vote.load(Ordering::SeqCst), 1);
        assert_eq!(saw_handover.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_creates_empty_bus() {
        assert_eq!(EventBus::default().listener_count(), 0);
    }
}
