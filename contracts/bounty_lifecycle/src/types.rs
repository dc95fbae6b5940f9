//! # Types
//!
//! Shared data structures used across all modules of the bounty contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Bounty` is internally stored as two separate ledger entries:
//!
//! - [`BountyConfig`] — written once when the bounty is opened; never mutated.
//!   Its presence is what makes an id "allocated".
//! - [`BountyRecord`] — rewritten on every lifecycle transition.
//!
//! The public API exposes the reconstructed [`Bounty`] struct.
//!
//! ### State as a Finite-State Machine
//!
//! ```text
//!            ┌──────── deny (before deadline) ───────┐
//!            ▼                                       │
//! open ──► Open ──── submit_proof ────► Submitted ───┤
//!                                           │        │
//!                                validate   │        └─ deny (at/after deadline) ──► Expired
//!                                           ▼
//!                                       Validated
//! ```
//!
//! `Validated` and `Expired` are terminal.

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Lifecycle state of a bounty.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BountyState {
    /// Accepting proof submissions.
    Open,
    /// A proof is awaiting the owner's decision.
    Submitted,
    /// Proof accepted by the owner and the verifier.
    Validated,
    /// Denied after the submission deadline had passed.
    Expired,
}

impl BountyState {
    /// `true` for states no entry point can leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BountyState::Validated | BountyState::Expired)
    }
}

/// Immutable bounty configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyConfig {
    pub id: u64,
    pub owner: Address,
    pub submission_deadline: u64,
    pub verification_period: u64,
    pub metadata_uri: String,
}

/// Mutable per-bounty state, rewritten on each transition.
///
/// `contributor`, `attestation_reference` and `submitted_time` are not cleared
/// when a denial reopens the bounty; they are stale until the next submission.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyRecord {
    pub state: BountyState,
    pub submitted_time: u64,
    pub contributor: Option<Address>,
    pub attestation_reference: Option<BytesN<32>>,
}

/// Full representation of a bounty, reconstructed from config + record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bounty {
    /// Unique identifier (auto-incremented, starting at 1).
    pub id: u64,
    /// Sponsor who opened the bounty and decides on submitted proofs.
    pub owner: Address,
    /// Last ledger timestamp at which a proof may be submitted.
    pub submission_deadline: u64,
    /// Seconds after a submission during which the owner may decide.
    pub verification_period: u64,
    /// Timestamp of the most recent submission (0 until the first one).
    pub submitted_time: u64,
    /// Whoever last submitted a proof.
    pub contributor: Option<Address>,
    /// Reference to the most recently submitted proof.
    pub attestation_reference: Option<BytesN<32>>,
    /// Current lifecycle state.
    pub state: BountyState,
}

impl Bounty {
    pub(crate) fn from_parts(config: BountyConfig, record: BountyRecord) -> Self {
        Bounty {
            id: config.id,
            owner: config.owner,
            submission_deadline: config.submission_deadline,
            verification_period: config.verification_period,
            submitted_time: record.submitted_time,
            contributor: record.contributor,
            attestation_reference: record.attestation_reference,
            state: record.state,
        }
    }

    /// The contributor and attestation of the live proof, if any.
    ///
    /// Returns `None` for `Open` and `Expired` bounties even when stale
    /// submission data from a denied proof is still stored.
    pub fn active_proof(&self) -> Option<(Address, BytesN<32>)> {
        match self.state {
            BountyState::Submitted | BountyState::Validated => Some((
                self.contributor.clone()?,
                self.attestation_reference.clone()?,
            )),
            BountyState::Open | BountyState::Expired => None,
        }
    }
}
