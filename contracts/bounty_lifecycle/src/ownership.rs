//! # Ownership
//!
//! The narrow ownership capability the lifecycle depends on: who sponsors a
//! given bounty and whether a principal is that sponsor. Ownership is fixed
//! at creation and backed by the immutable `BountyConfig` entry; there is no
//! transfer path.

use soroban_sdk::{Address, Env, String};

use crate::storage;
use crate::Error;

/// The sponsor of bounty `id`.
pub fn owner_of(env: &Env, id: u64) -> Result<Address, Error> {
    storage::read_bounty_config(env, id)
        .map(|config| config.owner)
        .ok_or(Error::NotFound)
}

/// `true` iff `id` is allocated and `principal` is its sponsor.
pub fn is_owner(env: &Env, id: u64, principal: &Address) -> bool {
    matches!(owner_of(env, id), Ok(owner) if owner == *principal)
}

/// Metadata URI recorded when the bounty was opened.
pub fn token_uri(env: &Env, id: u64) -> Result<String, Error> {
    storage::read_bounty_config(env, id)
        .map(|config| config.metadata_uri)
        .ok_or(Error::NotFound)
}
