//! The role pointers and their self-amending setters.

use serde::{Deserialize, Serialize};
use steward_types::{Address, Role};

use crate::error::RelayError;

/// A completed role transfer, kept for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handover {
    pub role: Role,
    pub from: Address,
    pub to: Address,
}

/// Registry of the active governance and decision-module implementations.
///
/// Authorization is a capability check on the caller's address: only the
/// current holder of a role may replace it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relay {
    governance: Address,
    decision_module: Address,
    handovers: Vec<Handover>,
}

impl Relay {
    /// Create a registry with the genesis role holders.
    pub fn new(governance: Address, decision_module: Address) -> Self {
        Self {
            governance,
            decision_module,
            handovers: Vec::new(),
        }
    }

    pub fn governance_role(&self) -> Address {
        self.governance
    }

    pub fn decision_module_role(&self) -> Address {
        self.decision_module
    }

    pub fn holder(&self, role: Role) -> Address {
        match role {
            Role::Governance => self.governance,
            Role::DecisionModule => self.decision_module,
        }
    }

    pub fn set_governance_role(
        &mut self,
        caller: &Address,
        new_holder: Address,
    ) -> Result<(), RelayError> {
        self.set_role(Role::Governance, caller, new_holder)
    }

    pub fn set_decision_module_role(
        &mut self,
        caller: &Address,
        new_holder: Address,
    ) -> Result<(), RelayError> {
        self.set_role(Role::DecisionModule, caller, new_holder)
    }

    /// Point `role` at `new_holder`. `caller` must be the current holder.
    pub fn set_role(
        &mut self,
        role: Role,
        caller: &Address,
        new_holder: Address,
    ) -> Result<(), RelayError> {
        let slot = match role {
            Role::Governance => &mut self.governance,
            Role::DecisionModule => &mut self.decision_module,
        };
        if *slot != *caller {
            tracing::warn!(%role, %caller, holder = %slot, "refused role update from non-holder");
            return Err(RelayError::Unauthorized {
                role,
                caller: *caller,
            });
        }
        let from = std::mem::replace(slot, new_holder);
        tracing::info!(%role, %from, to = %new_holder, "role pointer updated");
        self.handovers.push(Handover {
            role,
            from,
            to: new_holder,
        });
        Ok(())
    }

    /// Every role transfer since genesis, oldest first.
    pub fn handovers(&self) -> &[Handover] {
        &self.handovers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn holder_can_replace_itself() {
        let mut relay = Relay::new(addr(1), addr(2));
        relay.set_governance_role(&addr(1), addr(10)).unwrap();
        assert_eq!(relay.governance_role(), addr(10));
        assert_eq!(relay.decision_module_role(), addr(2));
        assert_eq!(
            relay.handovers(),
            &[Handover {
                role: Role::Governance,
                from: addr(1),
                to: addr(10),
            }]
        );
    }

    #[test]
    fn outsider_is_unauthorized() {
        let mut relay = Relay::new(addr(1), addr(2));
        let err = relay.set_governance_role(&addr(99), addr(10)).unwrap_err();
        assert_eq!(
            err,
            RelayError::Unauthorized {
                role: Role::Governance,
                caller: addr(99),
            }
        );
        assert_eq!(relay.governance_role(), addr(1));
        assert!(relay.handovers().is_empty());
    }

    #[test]
    fn roles_do_not_authorize_each_other() {
        let mut relay = Relay::new(addr(1), addr(2));
        assert!(relay.set_decision_module_role(&addr(1), addr(10)).is_err());
        assert!(relay.set_governance_role(&addr(2), addr(10)).is_err());
        relay.set_decision_module_role(&addr(2), addr(20)).unwrap();
        assert_eq!(relay.holder(Role::DecisionModule), addr(20));
    }

    #[test]
    fn previous_holder_loses_authority() {
        let mut relay = Relay::new(addr(1), addr(2));
        relay.set_role(Role::Governance, &addr(1), addr(3)).unwrap();
        assert!(relay.set_role(Role::Governance, &addr(1), addr(4)).is_err());
        relay.set_role(Role::Governance, &addr(3), addr(4)).unwrap();
        assert_eq!(relay.handovers().len(), 2);
    }

    #[test]
    fn survives_bincode() {
        let mut relay = Relay::new(addr(1), addr(2));
        relay.set_role(Role::Governance, &addr(1), addr(3)).unwrap();
        let bytes = bincode::serialize(&relay).unwrap();
        let decoded: Relay = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, relay);
    }
}
