//! Property tests for the vote bookkeeping invariants.
//!
//! Random sequences of votes, withdrawals and balance changes are replayed
//! against one voting phase; the tally invariants are checked after every step.

use proptest::prelude::*;

use steward_governance::{GovernanceEngine, Phase};
use steward_nullables::NullLedger;
use steward_relay::Relay;
use steward_types::{Address, Amount, CycleParams, Height, Role};

const W: u64 = 10;
const CANDIDATES: u64 = 4;
const VOTERS: u64 = 6;

fn candidate(n: u64) -> Address {
    Address::from_low_u64(1 + n)
}

fn voter(n: u64) -> Address {
    Address::from_low_u64(100 + n)
}

fn engine_id() -> Address {
    Address::from_low_u64(9000)
}

#[derive(Clone, Debug)]
enum Op {
    Choose { voter: u64, candidate: u64 },
    Decline { voter: u64 },
    SetBalance { voter: u64, raw: u128 },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..VOTERS, 0..CANDIDATES).prop_map(|(voter, candidate)| Op::Choose { voter, candidate }),
        1 => (0..VOTERS).prop_map(|voter| Op::Decline { voter }),
        2 => (0..VOTERS, 0u128..1_000).prop_map(|(voter, raw)| Op::SetBalance { voter, raw }),
    ]
}

/// Engine in its voting window with all candidates submitted.
fn voting_engine(ledger: &NullLedger) -> GovernanceEngine {
    let mut engine = GovernanceEngine::new(
        engine_id(),
        Role::Governance,
        CycleParams::new(W, 50).unwrap(),
        Height::GENESIS,
    )
    .unwrap();
    for c in 0..CANDIDATES {
        engine.submit(ledger, &voter(0), candidate(c)).unwrap();
    }
    ledger.set_height(W);
    engine
}

fn total_weight(engine: &GovernanceEngine) -> u128 {
    engine.candidates().iter().map(|c| c.weight.raw()).sum()
}

fn total_cast(engine: &GovernanceEngine) -> u128 {
    engine.ballots().map(|(_, b)| b.cast_weight.raw()).sum()
}

proptest! {
    #[test]
    fn tally_invariants_hold_after_every_step(
        balances in prop::collection::vec(0u128..1_000, VOTERS as usize),
        ops in prop::collection::vec(arb_op(), 1..60),
    ) {
        let ledger = NullLedger::new();
        for (i, raw) in balances.iter().enumerate() {
            ledger.set_balance(voter(i as u64), *raw);
        }
        let mut engine = voting_engine(&ledger);
        prop_assert_eq!(engine.current_phase(&ledger), Phase::Voting);

        for op in ops {
            let finalist_before = engine.finalist_weight();
            match op {
                Op::Choose { voter: v, candidate: c } => {
                    let _ = engine.choose(&ledger, &voter(v), &candidate(c));
                    // A vote never lowers the finalist's recorded weight.
                    prop_assert!(engine.finalist_weight() >= finalist_before);
                }
                Op::Decline { voter: v } => {
                    let _ = engine.decline(&ledger, &voter(v));
                }
                Op::SetBalance { voter: v, raw } => ledger.set_balance(voter(v), raw),
            }

            // Weight conservation: the floor weight is the only offset.
            prop_assert_eq!(total_weight(&engine) - CANDIDATES as u128, total_cast(&engine));

            // Every ballot points at exactly one submitted candidate.
            for (_, ballot) in engine.ballots() {
                prop_assert!(engine.candidate_weight(&ballot.candidate).is_some());
            }

            // No candidate outgrows the recorded finalist weight.
            let max = engine.candidates().iter().map(|c| c.weight).max().unwrap();
            prop_assert!(engine.finalist_weight() >= max);
            prop_assert!(engine.finalist().is_some());
        }
    }

    #[test]
    fn recast_with_unchanged_balance_is_a_no_op(
        raw in 1u128..1_000_000,
        c in 0..CANDIDATES,
    ) {
        let ledger = NullLedger::new().with_balance(voter(0), raw);
        let mut engine = voting_engine(&ledger);
        engine.choose(&ledger, &voter(0), &candidate(c)).unwrap();
        let once = engine.candidate_weight(&candidate(c));
        engine.choose(&ledger, &voter(0), &candidate(c)).unwrap();
        prop_assert_eq!(engine.candidate_weight(&candidate(c)), once);
        prop_assert_eq!(once, Some(Amount::new(raw + 1)));
    }

    #[test]
    fn close_moves_pointer_iff_quorum_was_reached(
        balances in prop::collection::vec(1u128..1_000, VOTERS as usize),
        supporters in prop::collection::vec(any::<bool>(), VOTERS as usize),
        quorum in 0u8..=100,
    ) {
        let ledger = NullLedger::new();
        for (i, raw) in balances.iter().enumerate() {
            ledger.set_balance(voter(i as u64), *raw);
        }
        let mut engine = GovernanceEngine::new(
            engine_id(),
            Role::Governance,
            CycleParams::new(W, quorum).unwrap(),
            Height::GENESIS,
        )
        .unwrap();
        let mut relay = Relay::new(engine_id(), Address::from_low_u64(9001));
        engine.submit(&ledger, &voter(0), candidate(0)).unwrap();

        ledger.set_height(2 * W);
        for (i, backs) in supporters.iter().enumerate() {
            if *backs {
                engine.decide(&ledger, &voter(i as u64)).unwrap();
            }
        }

        ledger.set_height(3 * W);
        let quorum_before = engine.is_quorum_reached(&ledger);
        let pointer_before = relay.governance_role();
        let outcome = engine.close(&ledger, &mut relay).unwrap();

        prop_assert_eq!(outcome.quorum_reached, quorum_before);
        if quorum_before {
            prop_assert_eq!(relay.governance_role(), candidate(0));
        } else {
            prop_assert_eq!(relay.governance_role(), pointer_before);
        }

        // Rotation: exactly one step, nothing carried over.
        prop_assert_eq!(engine.cycle_index(), 1);
        prop_assert!(engine.candidates().is_empty());
        prop_assert_eq!(engine.ballots().count(), 0);
        prop_assert_eq!(engine.supports().count(), 0);
        prop_assert_eq!(engine.finalist_support(), Amount::ZERO);
    }
}
