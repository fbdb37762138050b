//! The two governed roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A role whose holder is elected by a governance cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The implementation allowed to amend protocol parameters.
    Governance,
    /// The implementation that evaluates decisions on behalf of governance.
    DecisionModule,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Governance, Role::DecisionModule];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Governance => "governance",
            Self::DecisionModule => "decision_module",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
