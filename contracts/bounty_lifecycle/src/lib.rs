//! # Bounty Lifecycle Contract
//!
//! A single Soroban contract, `BountyLifecycle`, tracking funded tasks from
//! the moment a sponsor opens them until a contributor's proof is validated
//! or the bounty runs out of time.
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Bootstrap    | [`BountyLifecycle::init`], `set_verifier`        |
//! | Creation     | [`BountyLifecycle::open_bounty`]                 |
//! | Submission   | [`BountyLifecycle::submit_proof`]                |
//! | Decision     | `validate_proof`, `deny_proof`                   |
//! | Queries      | `get_bounty`, `list_open_bounties`, `owner_of`, `is_owner`, `token_uri`, `bounty_count` |
//!
//! ## Architecture
//!
//! Storage access is delegated to [`storage`], sponsor lookups to
//! [`ownership`], proof checking to the external contract behind
//! [`verifier`]. Every entry point either completes its transition or
//! returns an [`Error`] with no storage written.
//!
//! Deadline comparisons are inclusive: a proof submitted at exactly
//! `submission_deadline` is accepted, and the owner may still decide at
//! exactly `submitted_time + verification_period`.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Bytes, BytesN, Env, String, Vec};

mod events;
mod ownership;
mod storage;
mod types;
pub mod verifier;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use events::{BountyCreated, ProofDenied, ProofSubmitted, ProofValidated};
pub use types::{Bounty, BountyState};

use types::{BountyConfig, BountyRecord};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Submission deadline is not strictly in the future.
    InvalidDeadline = 1,
    /// No bounty was ever allocated under this id.
    NotFound = 2,
    /// Submission attempted while the bounty is not `Open`.
    NotOpen = 3,
    /// Submission attempted after the submission deadline.
    Expired = 4,
    /// Decision attempted while the bounty is not `Submitted`.
    NotSubmitted = 5,
    /// Decision attempted after the verification window closed.
    VerificationWindowExpired = 6,
    /// Caller is not the bounty owner (or not the admin).
    Unauthorized = 7,
    /// The attestation verifier declined or failed on the proof.
    AttestationRejected = 8,
    AlreadyInitialized = 9,
    NotInitialized = 10,
}

#[contract]
pub struct BountyLifecycle;

#[contractimpl]
impl BountyLifecycle {
    // ─────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────

    /// Set the admin and the attestation verifier contract.
    ///
    /// Must be called exactly once after deployment.
    pub fn init(env: Env, admin: Address, verifier: Address) -> Result<(), Error> {
        admin.require_auth();
        if storage::has_admin(&env) {
            return Err(Error::AlreadyInitialized);
        }
        storage::set_admin(&env, &admin);
        storage::set_verifier(&env, &verifier);
        events::emit_initialized(&env, admin);
        Ok(())
    }

    /// Point the contract at a different attestation verifier.
    pub fn set_verifier(env: Env, admin: Address, verifier: Address) -> Result<(), Error> {
        admin.require_auth();
        let stored = storage::get_admin(&env).ok_or(Error::NotInitialized)?;
        if stored != admin {
            return Err(Error::Unauthorized);
        }
        storage::set_verifier(&env, &verifier);
        events::emit_verifier_set(&env, verifier);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────

    /// Open a new bounty sponsored by `owner` and return its id.
    pub fn open_bounty(
        env: Env,
        owner: Address,
        submission_deadline: u64,
        verification_period: u64,
        metadata_uri: String,
    ) -> Result<u64, Error> {
        owner.require_auth();

        if submission_deadline <= env.ledger().timestamp() {
            return Err(Error::InvalidDeadline);
        }

        let id = storage::allocate_bounty_id(&env);
        let config = BountyConfig {
            id,
            owner: owner.clone(),
            submission_deadline,
            verification_period,
            metadata_uri,
        };
        let record = BountyRecord {
            state: BountyState::Open,
            submitted_time: 0,
            contributor: None,
            attestation_reference: None,
        };
        storage::save_bounty(&env, &config, &record);

        events::emit_bounty_created(&env, id, owner);
        Ok(id)
    }

    /// Claim an open bounty by submitting a proof reference.
    ///
    /// Open to any principal. A later submission after a denial overwrites
    /// the previous contributor, reference and submission time.
    pub fn submit_proof(
        env: Env,
        id: u64,
        submitter: Address,
        attestation_reference: BytesN<32>,
    ) -> Result<(), Error> {
        submitter.require_auth();

        let config = storage::load_bounty_config(&env, id).ok_or(Error::NotFound)?;
        let mut record = storage::load_bounty_record(&env, id).ok_or(Error::NotFound)?;

        if record.state != BountyState::Open {
            return Err(Error::NotOpen);
        }
        let now = env.ledger().timestamp();
        if now > config.submission_deadline {
            return Err(Error::Expired);
        }

        record.state = BountyState::Submitted;
        record.submitted_time = now;
        record.contributor = Some(submitter.clone());
        record.attestation_reference = Some(attestation_reference.clone());
        storage::save_bounty_record(&env, id, &record);

        events::emit_proof_submitted(&env, id, submitter, attestation_reference);
        Ok(())
    }

    /// Accept the submitted proof. Terminal on success.
    ///
    /// The verifier is consulted only after every local check has passed; its
    /// rejection leaves the bounty `Submitted`.
    pub fn validate_proof(
        env: Env,
        id: u64,
        caller: Address,
        attestation_payload: Bytes,
    ) -> Result<(), Error> {
        caller.require_auth();

        let (config, mut record) = Self::checks_before_decision(&env, id, &caller)?;
        let contributor = record.contributor.clone().ok_or(Error::NotSubmitted)?;
        let reference = record
            .attestation_reference
            .clone()
            .ok_or(Error::NotSubmitted)?;

        let verifier_id = storage::get_verifier(&env).ok_or(Error::NotInitialized)?;
        if !verifier::accepts(&env, &verifier_id, &reference, &attestation_payload) {
            return Err(Error::AttestationRejected);
        }

        record.state = BountyState::Validated;
        storage::save_bounty_record(&env, id, &record);

        events::emit_proof_validated(&env, id, config.owner, contributor);
        Ok(())
    }

    /// Reject the submitted proof.
    ///
    /// Reopens the bounty while the submission deadline is still ahead;
    /// expires it once `now >= submission_deadline`.
    pub fn deny_proof(env: Env, id: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let (config, mut record) = Self::checks_before_decision(&env, id, &caller)?;

        record.state = if env.ledger().timestamp() >= config.submission_deadline {
            BountyState::Expired
        } else {
            BountyState::Open
        };
        storage::save_bounty_record(&env, id, &record);

        events::emit_proof_denied(&env, id, config.owner, record.state);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Retrieve a bounty by id.
    pub fn get_bounty(env: Env, id: u64) -> Result<Bounty, Error> {
        storage::load_bounty(&env, id).ok_or(Error::NotFound)
    }

    /// All bounties currently in the `Open` state, in id order.
    pub fn list_open_bounties(env: Env) -> Vec<Bounty> {
        let mut open = Vec::new(&env);
        for id in 1..=storage::bounty_count(&env) {
            if let Some(bounty) = storage::load_bounty(&env, id) {
                if bounty.state == BountyState::Open {
                    open.push_back(bounty);
                }
            }
        }
        open
    }

    pub fn bounty_count(env: Env) -> u64 {
        storage::bounty_count(&env)
    }

    pub fn owner_of(env: Env, id: u64) -> Result<Address, Error> {
        ownership::owner_of(&env, id)
    }

    pub fn is_owner(env: Env, id: u64, principal: Address) -> bool {
        ownership::is_owner(&env, id, &principal)
    }

    pub fn token_uri(env: Env, id: u64) -> Result<String, Error> {
        ownership::token_uri(&env, id)
    }
}

impl BountyLifecycle {
    /// Gate shared by validate and deny, checked in order: existence,
    /// ownership, `Submitted` state, verification window.
    fn checks_before_decision(
        env: &Env,
        id: u64,
        caller: &Address,
    ) -> Result<(BountyConfig, BountyRecord), Error> {
        let config = storage::load_bounty_config(env, id).ok_or(Error::NotFound)?;
        if !ownership::is_owner(env, id, caller) {
            return Err(Error::Unauthorized);
        }
        let record = storage::load_bounty_record(env, id).ok_or(Error::NotFound)?;
        if record.state != BountyState::Submitted {
            return Err(Error::NotSubmitted);
        }
        let window_end = record
            .submitted_time
            .saturating_add(config.verification_period);
        if env.ledger().timestamp() > window_end {
            return Err(Error::VerificationWindowExpired);
        }
        Ok((config, record))
    }
}
