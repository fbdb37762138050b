use steward_types::{Address, Role};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("{caller} does not hold the {role} role")]
    Unauthorized { role: Role, caller: Address },
}
