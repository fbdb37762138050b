//! Scripted replay of governor operations.
//!
//! A script is a JSON array of steps, each tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "mint", "to": "0x…", "amount": 100 },
//!   { "op": "submit", "role": "governance", "caller": "0x…", "candidate": "0x…" },
//!   { "op": "advance", "blocks": 10 },
//!   { "op": "close", "role": "governance" }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use steward_governance::CycleOutcome;
use steward_types::{Address, Amount, Height, Role};

use crate::governor::Governor;
use crate::NodeError;

/// One governor operation.
///
/// Amounts are whole `u64` units in scripts; the ledger widens them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Advance { blocks: u64 },
    SetClock { role: Role, height: Height },
    ClearClock { role: Role },
    Mint { to: Address, amount: u64 },
    Transfer { from: Address, to: Address, amount: u64 },
    Submit { role: Role, caller: Address, candidate: Address },
    Choose { role: Role, caller: Address, candidate: Address },
    Decline { role: Role, caller: Address },
    Decide { role: Role, caller: Address },
    Dither { role: Role, caller: Address },
    Close { role: Role },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::SetClock { .. } => "set_clock",
            Self::ClearClock { .. } => "clear_clock",
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Submit { .. } => "submit",
            Self::Choose { .. } => "choose",
            Self::Decline { .. } => "decline",
            Self::Decide { .. } => "decide",
            Self::Dither { .. } => "dither",
            Self::Close { .. } => "close",
        }
    }
}

/// What a successfully applied step produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutput {
    Done,
    Height(Height),
    Closed(CycleOutcome),
}

pub fn parse_script(json: &str) -> Result<Vec<Step>, NodeError> {
    serde_json::from_str(json).map_err(|e| NodeError::Script(e.to_string()))
}

impl Governor {
    /// Apply one step. A failed step leaves the governor unchanged.
    pub fn apply(&mut self, step: &Step) -> Result<StepOutput, NodeError> {
        let output = match step {
            Step::Advance { blocks } => StepOutput::Height(self.advance(*blocks)),
            Step::SetClock { role, height } => {
                self.set_clock(*role, *height);
                StepOutput::Done
            }
            Step::ClearClock { role } => {
                self.clear_clock(*role);
                StepOutput::Done
            }
            Step::Mint { to, amount } => {
                self.mint(to, Amount::from(*amount))?;
                StepOutput::Done
            }
            Step::Transfer { from, to, amount } => {
                self.transfer(from, to, Amount::from(*amount))?;
                StepOutput::Done
            }
            Step::Submit {
                role,
                caller,
                candidate,
            } => {
                self.submit(*role, caller, *candidate)?;
                StepOutput::Done
            }
            Step::Choose {
                role,
                caller,
                candidate,
            } => {
                self.choose(*role, caller, candidate)?;
                StepOutput::Done
            }
            Step::Decline { role, caller } => {
                self.decline(*role, caller)?;
                StepOutput::Done
            }
            Step::Decide { role, caller } => {
                self.decide(*role, caller)?;
                StepOutput::Done
            }
            Step::Dither { role, caller } => {
                self.dither(*role, caller)?;
                StepOutput::Done
            }
            Step::Close { role } => StepOutput::Closed(self.close(*role)?),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        let json = r#"[
            { "op": "advance", "blocks": 3 },
            { "op": "set_clock", "role": "governance", "height": 25 },
            { "op": "clear_clock", "role": "governance" },
            { "op": "mint", "to": "0x0000000000000000000000000000000000000010", "amount": 100 },
            { "op": "transfer",
              "from": "0x0000000000000000000000000000000000000010",
              "to": "0x0000000000000000000000000000000000000011", "amount": 5 },
            { "op": "submit", "role": "decision_module",
              "caller": "0x0000000000000000000000000000000000000010",
              "candidate": "0x00000000000000000000000000000000000000aa" },
            { "op": "choose", "role": "decision_module",
              "caller": "0x0000000000000000000000000000000000000010",
              "candidate": "0x00000000000000000000000000000000000000aa" },
            { "op": "decline", "role": "decision_module",
              "caller": "0x0000000000000000000000000000000000000010" },
            { "op": "decide", "role": "governance",
              "caller": "0x0000000000000000000000000000000000000010" },
            { "op": "dither", "role": "governance",
              "caller": "0x0000000000000000000000000000000000000010" },
            { "op": "close", "role": "governance" }
        ]"#;
        let steps = parse_script(json).unwrap();
        let names: Vec<_> = steps.iter().map(Step::name).collect();
        assert_eq!(
            names,
            [
                "advance",
                "set_clock",
                "clear_clock",
                "mint",
                "transfer",
                "submit",
                "choose",
                "decline",
                "decide",
                "dither",
                "close"
            ]
        );
        assert_eq!(
            steps[1],
            Step::SetClock {
                role: Role::Governance,
                height: Height::new(25)
            }
        );
    }

    #[test]
    fn unknown_op_is_a_script_error() {
        let err = parse_script(r#"[{ "op": "vote" }]"#).unwrap_err();
        assert!(matches!(err, NodeError::Script(_)));
    }

    #[test]
    fn bad_address_is_a_script_error() {
        let json = r#"[{ "op": "mint", "to": "0x12", "amount": 1 }]"#;
        assert!(matches!(parse_script(json), Err(NodeError::Script(_))));
    }

    #[test]
    fn step_serializes_with_op_tag() {
        let step = Step::Advance { blocks: 4 };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({ "op": "advance", "blocks": 4 }));
    }
}
