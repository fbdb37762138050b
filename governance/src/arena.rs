//! Per-cycle records keyed by `(cycle_index, address)`.
//!
//! Nothing is deleted when a cycle closes: the engine moves on to the next
//! index and the old entries stay readable for audit. Ordered maps keep range
//! scans over one cycle cheap and iteration deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use steward_types::{Address, Amount, Height};

/// A proposed replacement role-holder within one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub address: Address,
    /// Floor weight 1 plus every ballot currently cast for this candidate.
    pub weight: Amount,
    /// Submission order within the cycle, starting at 0.
    pub position: u32,
    pub submitted_at: Height,
    pub submitted_by: Address,
}

/// A participant's vote for one candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub candidate: Address,
    /// Live balance captured when the ballot was last cast.
    pub cast_weight: Amount,
    pub cast_at: Height,
}

/// A participant's support for the cycle's finalist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportBallot {
    pub weight: Amount,
    pub cast_at: Height,
}

/// Result of closing a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub finalist: Option<Address>,
    pub finalist_weight: Amount,
    pub finalist_support: Amount,
    /// Support needed for the swap, from the supply at close time.
    pub threshold: Amount,
    pub quorum_reached: bool,
    pub closed_at: Height,
}

impl CycleOutcome {
    /// The address the role pointer moved to, if it moved.
    pub fn elected(&self) -> Option<Address> {
        if self.quorum_reached {
            self.finalist
        } else {
            None
        }
    }
}

/// Aggregate state of one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub index: u64,
    /// Reference height the cycle's phases are measured from.
    pub started_at: Height,
    pub finalist: Option<Address>,
    pub finalist_weight: Amount,
    pub finalist_support: Amount,
    pub candidate_count: u32,
    /// Set once the cycle is closed.
    pub outcome: Option<CycleOutcome>,
}

impl CycleRecord {
    pub fn open(index: u64, started_at: Height) -> Self {
        Self {
            index,
            started_at,
            finalist: None,
            finalist_weight: Amount::ZERO,
            finalist_support: Amount::ZERO,
            candidate_count: 0,
            outcome: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleArena {
    closed: BTreeMap<u64, CycleRecord>,
    candidates: BTreeMap<(u64, Address), Candidate>,
    ballots: BTreeMap<(u64, Address), Ballot>,
    supports: BTreeMap<(u64, Address), SupportBallot>,
}

fn cycle_range(cycle: u64) -> std::ops::RangeInclusive<(u64, Address)> {
    (cycle, Address::ZERO)..=(cycle, Address::MAX)
}

impl CycleArena {
    pub fn closed_record(&self, cycle: u64) -> Option<&CycleRecord> {
        self.closed.get(&cycle)
    }

    /// Closed cycles, oldest first.
    pub fn closed_records(&self) -> impl Iterator<Item = &CycleRecord> {
        self.closed.values()
    }

    pub(crate) fn archive(&mut self, record: CycleRecord) {
        self.closed.insert(record.index, record);
    }

    pub fn candidate(&self, cycle: u64, address: &Address) -> Option<&Candidate> {
        self.candidates.get(&(cycle, *address))
    }

    /// Candidates of `cycle` in submission order.
    pub fn candidates(&self, cycle: u64) -> Vec<&Candidate> {
        let mut list: Vec<&Candidate> = self
            .candidates
            .range(cycle_range(cycle))
            .map(|(_, c)| c)
            .collect();
        list.sort_by_key(|c| c.position);
        list
    }

    pub(crate) fn insert_candidate(&mut self, cycle: u64, candidate: Candidate) {
        self.candidates.insert((cycle, candidate.address), candidate);
    }

    pub(crate) fn set_weight(&mut self, cycle: u64, address: &Address, weight: Amount) {
        if let Some(candidate) = self.candidates.get_mut(&(cycle, *address)) {
            candidate.weight = weight;
        }
    }

    pub fn ballot(&self, cycle: u64, voter: &Address) -> Option<&Ballot> {
        self.ballots.get(&(cycle, *voter))
    }

    /// `(voter, ballot)` pairs of `cycle`, in voter address order.
    pub fn ballots(&self, cycle: u64) -> impl Iterator<Item = (&Address, &Ballot)> {
        self.ballots
            .range(cycle_range(cycle))
            .map(|((_, voter), ballot)| (voter, ballot))
    }

    pub(crate) fn put_ballot(&mut self, cycle: u64, voter: Address, ballot: Ballot) {
        self.ballots.insert((cycle, voter), ballot);
    }

    pub(crate) fn take_ballot(&mut self, cycle: u64, voter: &Address) -> Option<Ballot> {
        self.ballots.remove(&(cycle, *voter))
    }

    pub fn support(&self, cycle: u64, voter: &Address) -> Option<&SupportBallot> {
        self.supports.get(&(cycle, *voter))
    }

    pub fn supports(&self, cycle: u64) -> impl Iterator<Item = (&Address, &SupportBallot)> {
        self.supports
            .range(cycle_range(cycle))
            .map(|((_, voter), support)| (voter, support))
    }

    pub(crate) fn put_support(&mut self, cycle: u64, voter: Address, support: SupportBallot) {
        self.supports.insert((cycle, voter), support);
    }

    pub(crate) fn take_support(&mut self, cycle: u64, voter: &Address) -> Option<SupportBallot> {
        self.supports.remove(&(cycle, *voter))
    }
}
