//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by the bounty contract:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type      | Description                              |
//! |---------------|-----------|------------------------------------------|
//! | `BountyCount` | `u64`     | Last allocated bounty id (0 = none yet)  |
//! | `Admin`       | `Address` | Address allowed to rotate the verifier   |
//! | `Verifier`    | `Address` | Attestation verifier contract            |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                 | Type           | Description                     |
//! |---------------------|----------------|---------------------------------|
//! | `BountyConfig(id)`  | `BountyConfig` | Immutable bounty configuration  |
//! | `BountyState(id)`   | `BountyRecord` | Mutable lifecycle state         |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining,
//! on lifecycle writes only. Query reads leave TTLs as they are.
//!
//! An id is allocated iff its `BountyConfig` entry exists. Absence is checked
//! structurally, never by comparing the owner against a sentinel address.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Bounty, BountyConfig, BountyRecord};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Last allocated bounty id (Instance).
    BountyCount,
    /// Contract administrator (Instance).
    Admin,
    /// Attestation verifier contract address (Instance).
    Verifier,
    /// Immutable bounty configuration keyed by id (Persistent).
    BountyConfig(u64),
    /// Mutable bounty state keyed by id (Persistent).
    BountyState(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Reads, increments, and stores the bounty counter.
/// Returns the freshly allocated id (post-increment value, so ids start at 1).
pub fn allocate_bounty_id(env: &Env) -> u64 {
    bump_instance(env);
    let next = bounty_count(env) + 1;
    env.storage().instance().set(&DataKey::BountyCount, &next);
    next
}

/// Number of ids allocated so far; also the highest allocated id.
pub fn bounty_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::BountyCount)
        .unwrap_or(0)
}

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    bump_instance(env);
}

pub fn get_admin(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Admin)
}

pub fn set_verifier(env: &Env, verifier: &Address) {
    env.storage().instance().set(&DataKey::Verifier, verifier);
    bump_instance(env);
}

pub fn get_verifier(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Verifier)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Write the immutable config and the initial record of a new bounty.
pub fn save_bounty(env: &Env, config: &BountyConfig, record: &BountyRecord) {
    let config_key = DataKey::BountyConfig(config.id);
    env.storage().persistent().set(&config_key, config);
    bump_persistent(env, &config_key);
    save_bounty_record(env, config.id, record);
}

/// Load the full `Bounty`, or `None` if `id` was never allocated.
///
/// Query path: entry TTLs are left untouched.
pub fn load_bounty(env: &Env, id: u64) -> Option<Bounty> {
    let config = read_bounty_config(env, id)?;
    let record = env.storage().persistent().get(&DataKey::BountyState(id))?;
    Some(Bounty::from_parts(config, record))
}

/// Config lookup for queries; does not extend the entry's TTL.
pub fn read_bounty_config(env: &Env, id: u64) -> Option<BountyConfig> {
    env.storage().persistent().get(&DataKey::BountyConfig(id))
}

/// Config lookup for lifecycle transitions; extends the entry's TTL.
pub fn load_bounty_config(env: &Env, id: u64) -> Option<BountyConfig> {
    let key = DataKey::BountyConfig(id);
    let config: Option<BountyConfig> = env.storage().persistent().get(&key);
    if config.is_some() {
        bump_persistent(env, &key);
    }
    config
}

pub fn load_bounty_record(env: &Env, id: u64) -> Option<BountyRecord> {
    let key = DataKey::BountyState(id);
    let record: Option<BountyRecord> = env.storage().persistent().get(&key);
    if record.is_some() {
        bump_persistent(env, &key);
    }
    record
}

/// Overwrite only the mutable record; the config entry is never rewritten.
pub fn save_bounty_record(env: &Env, id: u64, record: &BountyRecord) {
    let key = DataKey::BountyState(id);
    env.storage().persistent().set(&key, record);
    bump_persistent(env, &key);
}
