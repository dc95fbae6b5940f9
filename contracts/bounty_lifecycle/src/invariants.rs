#![allow(dead_code)]

extern crate std;

use crate::types::{Bounty, BountyState};

/// INV-1: Bounty ids are allocated from 1 and never reused.
pub fn assert_sequential_ids(bounties: &[Bounty]) {
    for (i, bounty) in bounties.iter().enumerate() {
        assert_eq!(
            bounty.id,
            i as u64 + 1,
            "INV-1 violated: expected id {}, got {}",
            i + 1,
            bounty.id
        );
    }
}

/// INV-2: A submitted or validated bounty carries the proof that put it there.
pub fn assert_active_proof_present(bounty: &Bounty) {
    if matches!(bounty.state, BountyState::Submitted | BountyState::Validated) {
        assert!(
            bounty.active_proof().is_some(),
            "INV-2 violated: bounty {} is {:?} without contributor/attestation",
            bounty.id,
            bounty.state
        );
    }
}

/// INV-3: Only these transitions exist:
///   Open      -> Submitted
///   Submitted -> Validated | Open | Expired
///   Validated -> (none)
///   Expired   -> (none)
pub fn assert_valid_transition(from: &BountyState, to: &BountyState) {
    let valid = matches!(
        (from, to),
        (BountyState::Open, BountyState::Submitted)
            | (BountyState::Submitted, BountyState::Validated)
            | (BountyState::Submitted, BountyState::Open)
            | (BountyState::Submitted, BountyState::Expired)
    );

    assert!(
        valid,
        "INV-3 violated: invalid transition from {:?} to {:?}",
        from, to
    );
}

/// INV-4: Fields fixed at creation never change.
pub fn assert_immutable_fields(original: &Bounty, current: &Bounty) {
    assert_eq!(original.id, current.id, "INV-4 violated: bounty id changed");
    assert_eq!(
        original.owner, current.owner,
        "INV-4 violated: bounty owner changed"
    );
    assert_eq!(
        original.submission_deadline, current.submission_deadline,
        "INV-4 violated: submission_deadline changed"
    );
    assert_eq!(
        original.verification_period, current.verification_period,
        "INV-4 violated: verification_period changed"
    );
}

/// INV-5: A failed operation leaves the stored bounty untouched.
pub fn assert_unchanged(before: &Bounty, after: &Bounty) {
    assert_eq!(
        before, after,
        "INV-5 violated: bounty {} changed by a rejected operation",
        before.id
    );
}

/// Run all stateless bounty invariants.
pub fn assert_all_bounty_invariants(bounty: &Bounty) {
    assert_active_proof_present(bounty);
    assert!(
        bounty.submission_deadline > 0,
        "bounty {} has zero submission_deadline",
        bounty.id
    );
}
