//! # Events
//!
//! Every lifecycle transition publishes one event with topics
//! `(symbol, bounty_id)` and one of the payload structs below.
//!
//! | Topic       | Payload           |
//! |-------------|-------------------|
//! | `created`   | [`BountyCreated`] |
//! | `submitted` | [`ProofSubmitted`]|
//! | `validated` | [`ProofValidated`]|
//! | `denied`    | [`ProofDenied`]   |
//!
//! Admin actions publish `(init,)` and `(verifier,)` with a bare address.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

use crate::types::BountyState;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyCreated {
    pub id: u64,
    pub owner: Address,
    pub state: BountyState,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofSubmitted {
    pub id: u64,
    pub contributor: Address,
    pub attestation_reference: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofValidated {
    pub id: u64,
    pub owner: Address,
    pub contributor: Address,
}

/// `state` is where the denial left the bounty: `Open` or `Expired`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofDenied {
    pub id: u64,
    pub owner: Address,
    pub state: BountyState,
}

pub fn emit_bounty_created(env: &Env, id: u64, owner: Address) {
    env.events().publish(
        (symbol_short!("created"), id),
        BountyCreated {
            id,
            owner,
            state: BountyState::Open,
        },
    );
}

pub fn emit_proof_submitted(
    env: &Env,
    id: u64,
    contributor: Address,
    attestation_reference: BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("submitted"), id),
        ProofSubmitted {
            id,
            contributor,
            attestation_reference,
        },
    );
}

pub fn emit_proof_validated(env: &Env, id: u64, owner: Address, contributor: Address) {
    env.events().publish(
        (symbol_short!("validated"), id),
        ProofValidated {
            id,
            owner,
            contributor,
        },
    );
}

pub fn emit_proof_denied(env: &Env, id: u64, owner: Address, state: BountyState) {
    env.events().publish(
        (symbol_short!("denied"), id),
        ProofDenied { id, owner, state },
    );
}

pub fn emit_initialized(env: &Env, admin: Address) {
    env.events().publish((symbol_short!("init"),), admin);
}

pub fn emit_verifier_set(env: &Env, verifier: Address) {
    env.events().publish((symbol_short!("verifier"),), verifier);
}
