//! Governance cycle engine: elects the next holder of one role.
//!
//! Each call is one ledger transaction: it either commits completely or fails
//! with a named error and leaves the engine untouched. Weights are computed
//! in full before anything is written back.

use steward_ledger::{BalanceLedger, TransferGuard};
use steward_relay::Relay;
use steward_types::{Address, Amount, CycleParams, Height, Role};

use crate::arena::{Ballot, Candidate, CycleArena, CycleOutcome, CycleRecord, SupportBallot};
use crate::driver::CycleDriver;
use crate::error::GovernanceError;
use crate::phase::Phase;

/// Stake-weighted election cycle for a single role.
///
/// The engine is identified by `id`, the address the [`Relay`] knows it by.
/// It can only move the role pointer while it is the role's current holder.
#[derive(Clone, Debug)]
pub struct GovernanceEngine {
    id: Address,
    role: Role,
    params: CycleParams,
    cycle: u64,
    open: CycleRecord,
    arena: CycleArena,
    driver: CycleDriver,
}

impl GovernanceEngine {
    /// Create an engine whose first cycle is measured from `first_start`.
    ///
    /// Before `first_start` the engine is [`Phase::Idle`]; this is how two
    /// engines sharing a ledger run phase-offset cycles.
    pub fn new(
        id: Address,
        role: Role,
        params: CycleParams,
        first_start: Height,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            id,
            role,
            params,
            cycle: 0,
            open: CycleRecord::open(0, first_start),
            arena: CycleArena::default(),
            driver: CycleDriver::default(),
        })
    }

    pub(crate) fn from_parts(
        id: Address,
        role: Role,
        params: CycleParams,
        open: CycleRecord,
        arena: CycleArena,
    ) -> Self {
        Self {
            id,
            role,
            params,
            cycle: open.index,
            open,
            arena,
            driver: CycleDriver::default(),
        }
    }

    pub fn id(&self) -> Address {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn params(&self) -> &CycleParams {
        &self.params
    }

    // ── Clock ──────────────────────────────────────────────────────────

    /// Pin the engine's clock, overriding the ledger height.
    pub fn set_clock(&mut self, height: Height) {
        self.driver.set_clock(height);
    }

    /// Follow the ledger height again.
    pub fn clear_clock(&mut self) {
        self.driver.clear_clock();
    }

    pub fn now<L: BalanceLedger + ?Sized>(&self, ledger: &L) -> Height {
        self.driver.now(ledger.height())
    }

    pub fn phase_at(&self, now: Height) -> Phase {
        Phase::at(self.open.started_at, now, &self.params)
    }

    pub fn current_phase<L: BalanceLedger + ?Sized>(&self, ledger: &L) -> Phase {
        self.phase_at(self.now(ledger))
    }

    fn require_phase(
        &self,
        now: Height,
        expected: Phase,
        operation: &'static str,
    ) -> Result<(), GovernanceError> {
        let phase = self.phase_at(now);
        if phase != expected {
            return Err(GovernanceError::Phase { operation, phase });
        }
        Ok(())
    }

    // ── Submission ─────────────────────────────────────────────────────

    /// Submit `candidate` for the open cycle with the floor weight of 1.
    pub fn submit<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        submitter: &Address,
        candidate: Address,
    ) -> Result<(), GovernanceError> {
        let now = self.now(ledger);
        self.require_phase(now, Phase::Submission, "submit")?;
        if self.arena.candidate(self.cycle, &candidate).is_some() {
            return Err(GovernanceError::DuplicateCandidate(candidate));
        }

        let position = self.open.candidate_count;
        self.arena.insert_candidate(
            self.cycle,
            Candidate {
                address: candidate,
                weight: Amount::ONE,
                position,
                submitted_at: now,
                submitted_by: *submitter,
            },
        );
        self.open.candidate_count += 1;
        tracing::info!(
            role = %self.role,
            cycle = self.cycle,
            %candidate,
            %submitter,
            position,
            "candidate submitted"
        );
        self.promote_if_leading(candidate, Amount::ONE);
        Ok(())
    }

    // ── Voting ─────────────────────────────────────────────────────────

    /// Back `candidate` with the voter's live balance.
    ///
    /// Moving from another candidate releases the old weight first. Recasting
    /// for the same candidate resyncs the ballot to the current balance.
    pub fn choose<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        voter: &Address,
        candidate: &Address,
    ) -> Result<(), GovernanceError> {
        let now = self.now(ledger);
        self.require_phase(now, Phase::Voting, "choose")?;
        let cycle = self.cycle;
        let target_weight = self
            .arena
            .candidate(cycle, candidate)
            .map(|c| c.weight)
            .ok_or(GovernanceError::UnknownCandidate(*candidate))?;
        let balance = ledger.balance_of(voter);
        if balance.is_zero() {
            return Err(GovernanceError::InsufficientStake(*voter));
        }

        let previous = self.arena.ballot(cycle, voter).cloned();
        let mut released = None;
        let base = match &previous {
            Some(ballot) if ballot.candidate == *candidate => target_weight
                .checked_sub(ballot.cast_weight)
                .ok_or(GovernanceError::InconsistentTally(*candidate))?,
            Some(ballot) => {
                let old = self
                    .arena
                    .candidate(cycle, &ballot.candidate)
                    .ok_or(GovernanceError::InconsistentTally(ballot.candidate))?;
                let remaining = old
                    .weight
                    .checked_sub(ballot.cast_weight)
                    .ok_or(GovernanceError::InconsistentTally(ballot.candidate))?;
                released = Some((ballot.candidate, remaining));
                target_weight
            }
            None => target_weight,
        };
        let new_weight = base
            .checked_add(balance)
            .ok_or(GovernanceError::WeightOverflow(*candidate))?;

        if let Some((old_candidate, remaining)) = released {
            self.arena.set_weight(cycle, &old_candidate, remaining);
        }
        self.arena.set_weight(cycle, candidate, new_weight);
        self.arena.put_ballot(
            cycle,
            *voter,
            Ballot {
                candidate: *candidate,
                cast_weight: balance,
                cast_at: now,
            },
        );
        tracing::info!(
            role = %self.role,
            cycle,
            %voter,
            %candidate,
            weight = %balance,
            candidate_weight = %new_weight,
            "vote cast"
        );
        self.promote_if_leading(*candidate, new_weight);
        Ok(())
    }

    /// Withdraw the voter's ballot.
    ///
    /// The finalist is not re-derived here: a finalist whose weight drops
    /// keeps its seat until another candidate strictly exceeds the recorded
    /// finalist weight.
    pub fn decline<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        voter: &Address,
    ) -> Result<(), GovernanceError> {
        let now = self.now(ledger);
        self.require_phase(now, Phase::Voting, "decline")?;
        let cycle = self.cycle;
        let ballot = self
            .arena
            .ballot(cycle, voter)
            .ok_or(GovernanceError::NoActiveVote(*voter))?;
        let remaining = self
            .arena
            .candidate(cycle, &ballot.candidate)
            .and_then(|c| c.weight.checked_sub(ballot.cast_weight))
            .ok_or(GovernanceError::InconsistentTally(ballot.candidate))?;

        if let Some(ballot) = self.arena.take_ballot(cycle, voter) {
            self.arena.set_weight(cycle, &ballot.candidate, remaining);
            tracing::info!(
                role = %self.role,
                cycle,
                %voter,
                candidate = %ballot.candidate,
                released = %ballot.cast_weight,
                "vote withdrawn"
            );
        }
        Ok(())
    }

    /// Make `candidate` the finalist if `weight` strictly beats the record.
    /// Ties keep the incumbent.
    fn promote_if_leading(&mut self, candidate: Address, weight: Amount) {
        if weight <= self.open.finalist_weight {
            return;
        }
        if self.open.finalist != Some(candidate) {
            tracing::debug!(
                role = %self.role,
                cycle = self.cycle,
                %candidate,
                %weight,
                previous = ?self.open.finalist,
                "finalist changed"
            );
        }
        self.open.finalist = Some(candidate);
        self.open.finalist_weight = weight;
    }

    // ── Support ────────────────────────────────────────────────────────

    /// Back the finalist's promotion with the caller's live balance.
    pub fn decide<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        voter: &Address,
    ) -> Result<(), GovernanceError> {
        let now = self.now(ledger);
        self.require_phase(now, Phase::Support, "decide")?;
        let finalist = self.open.finalist.ok_or(GovernanceError::NoFinalist)?;
        let balance = ledger.balance_of(voter);
        if balance.is_zero() {
            return Err(GovernanceError::InsufficientStake(*voter));
        }

        let cycle = self.cycle;
        let base = match self.arena.support(cycle, voter) {
            Some(previous) => self
                .open
                .finalist_support
                .checked_sub(previous.weight)
                .ok_or(GovernanceError::InconsistentSupport { cycle })?,
            None => self.open.finalist_support,
        };
        let support = base
            .checked_add(balance)
            .ok_or(GovernanceError::WeightOverflow(finalist))?;

        self.arena.put_support(
            cycle,
            *voter,
            SupportBallot {
                weight: balance,
                cast_at: now,
            },
        );
        self.open.finalist_support = support;
        tracing::info!(
            role = %self.role,
            cycle,
            %voter,
            %finalist,
            weight = %balance,
            %support,
            "support cast"
        );
        Ok(())
    }

    /// Withdraw the caller's support for the finalist.
    pub fn dither<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        voter: &Address,
    ) -> Result<(), GovernanceError> {
        let now = self.now(ledger);
        self.require_phase(now, Phase::Support, "dither")?;
        let cycle = self.cycle;
        let previous = self
            .arena
            .support(cycle, voter)
            .ok_or(GovernanceError::NoActiveSupport(*voter))?;
        let support = self
            .open
            .finalist_support
            .checked_sub(previous.weight)
            .ok_or(GovernanceError::InconsistentSupport { cycle })?;

        if let Some(withdrawn) = self.arena.take_support(cycle, voter) {
            self.open.finalist_support = support;
            tracing::info!(
                role = %self.role,
                cycle,
                %voter,
                released = %withdrawn.weight,
                %support,
                "support withdrawn"
            );
        }
        Ok(())
    }

    // ── Close ──────────────────────────────────────────────────────────

    /// Close the cycle and start the next one at the current height.
    ///
    /// With quorum and a finalist, the engine's role pointer in `relay` moves
    /// to the finalist first; if the relay refuses, nothing changes and the
    /// error is returned.
    pub fn close<L: BalanceLedger + ?Sized>(
        &mut self,
        ledger: &L,
        relay: &mut Relay,
    ) -> Result<CycleOutcome, GovernanceError> {
        let now = self.now(ledger);
        let phase = self.phase_at(now);
        if !phase.can_close() {
            return Err(GovernanceError::Phase {
                operation: "close",
                phase,
            });
        }

        let threshold = self.quorum_threshold(ledger);
        let quorum_reached = self.quorum_met(threshold);
        if quorum_reached {
            if let Some(finalist) = self.open.finalist {
                relay.set_role(self.role, &self.id, finalist)?;
            }
        }

        let outcome = CycleOutcome {
            cycle: self.cycle,
            finalist: self.open.finalist,
            finalist_weight: self.open.finalist_weight,
            finalist_support: self.open.finalist_support,
            threshold,
            quorum_reached,
            closed_at: now,
        };
        let next = self.cycle + 1;
        let mut closed = std::mem::replace(&mut self.open, CycleRecord::open(next, now));
        closed.outcome = Some(outcome.clone());
        self.arena.archive(closed);
        self.cycle = next;

        tracing::info!(
            role = %self.role,
            cycle = outcome.cycle,
            finalist = ?outcome.finalist,
            support = %outcome.finalist_support,
            threshold = %outcome.threshold,
            quorum_reached,
            next_cycle = next,
            "cycle closed"
        );
        Ok(outcome)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn cycle_index(&self) -> u64 {
        self.cycle
    }

    pub fn cycle_started_at(&self) -> Height {
        self.open.started_at
    }

    /// Weight of `candidate` in the open cycle.
    pub fn candidate_weight(&self, candidate: &Address) -> Option<Amount> {
        self.candidate_weight_at(self.cycle, candidate)
    }

    pub fn candidate_weight_at(&self, cycle: u64, candidate: &Address) -> Option<Amount> {
        self.arena.candidate(cycle, candidate).map(|c| c.weight)
    }

    /// Candidates of the open cycle in submission order.
    pub fn candidates(&self) -> Vec<&Candidate> {
        self.arena.candidates(self.cycle)
    }

    pub fn candidates_at(&self, cycle: u64) -> Vec<&Candidate> {
        self.arena.candidates(cycle)
    }

    pub fn ballot(&self, voter: &Address) -> Option<&Ballot> {
        self.arena.ballot(self.cycle, voter)
    }

    pub fn ballot_at(&self, cycle: u64, voter: &Address) -> Option<&Ballot> {
        self.arena.ballot(cycle, voter)
    }

    /// Ballots of the open cycle, in voter address order.
    pub fn ballots(&self) -> impl Iterator<Item = (&Address, &Ballot)> {
        self.arena.ballots(self.cycle)
    }

    pub fn support(&self, voter: &Address) -> Option<&SupportBallot> {
        self.arena.support(self.cycle, voter)
    }

    pub fn supports(&self) -> impl Iterator<Item = (&Address, &SupportBallot)> {
        self.arena.supports(self.cycle)
    }

    pub fn finalist(&self) -> Option<Address> {
        self.open.finalist
    }

    pub fn finalist_weight(&self) -> Amount {
        self.open.finalist_weight
    }

    pub fn finalist_support(&self) -> Amount {
        self.open.finalist_support
    }

    /// Support the finalist needs at the ledger's current supply.
    pub fn quorum_threshold<L: BalanceLedger + ?Sized>(&self, ledger: &L) -> Amount {
        ledger
            .circulating_supply()
            .percent(self.params.quorum_percent)
    }

    fn quorum_met(&self, threshold: Amount) -> bool {
        self.open.finalist.is_some() && self.open.finalist_support >= threshold
    }

    /// Whether closing now would move the role pointer.
    pub fn is_quorum_reached<L: BalanceLedger + ?Sized>(&self, ledger: &L) -> bool {
        self.quorum_met(self.quorum_threshold(ledger))
    }

    /// Whether `participant` has weight at stake in the open cycle at `now`.
    pub fn transfer_locked_at(&self, participant: &Address, now: Height) -> bool {
        match self.phase_at(now) {
            Phase::Voting => self.arena.ballot(self.cycle, participant).is_some(),
            Phase::Support => self.arena.support(self.cycle, participant).is_some(),
            _ => false,
        }
    }

    /// The open cycle's aggregate record.
    pub fn open_record(&self) -> &CycleRecord {
        &self.open
    }

    /// Record of any cycle, open or closed.
    pub fn cycle_record(&self, cycle: u64) -> Option<&CycleRecord> {
        if cycle == self.cycle {
            Some(&self.open)
        } else {
            self.arena.closed_record(cycle)
        }
    }

    /// Outcomes of every closed cycle, oldest first.
    pub fn outcomes(&self) -> impl Iterator<Item = &CycleOutcome> {
        self.arena
            .closed_records()
            .filter_map(|record| record.outcome.as_ref())
    }

    /// Whether the relay has handed this engine's role to someone else.
    pub fn is_retired(&self, relay: &Relay) -> bool {
        relay.holder(self.role) != self.id
    }

    pub(crate) fn arena(&self) -> &CycleArena {
        &self.arena
    }
}

impl TransferGuard for GovernanceEngine {
    fn transfer_locked(&self, from: &Address, height: Height) -> bool {
        let locked = self.transfer_locked_at(from, self.driver.now(height));
        if locked {
            tracing::debug!(role = %self.role, cycle = self.cycle, account = %from, "stake locked by ballot");
        }
        locked
    }
}
