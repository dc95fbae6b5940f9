//! Canonical event types emitted by the bounty lifecycle contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/bounty_lifecycle/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the bounty contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A sponsor opened a bounty (`created` topic).
    BountyCreated,
    /// A contributor submitted a proof (`submitted` topic).
    ProofSubmitted,
    /// The owner accepted the proof (`validated` topic).
    ProofValidated,
    /// The owner rejected the proof (`denied` topic).
    ProofDenied,
    /// Contract bootstrap (`init` topic).
    Initialized,
    /// Attestation verifier rotated (`verifier` topic).
    VerifierSet,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::BountyCreated,
            "submitted" => Self::ProofSubmitted,
            "validated" => Self::ProofValidated,
            "denied" => Self::ProofDenied,
            "init" => Self::Initialized,
            "verifier" => Self::VerifierSet,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BountyCreated => "bounty_created",
            Self::ProofSubmitted => "proof_submitted",
            Self::ProofValidated => "proof_validated",
            Self::ProofDenied => "proof_denied",
            Self::Initialized => "initialized",
            Self::VerifierSet => "verifier_set",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "bounty_created" => Self::BountyCreated,
            "proof_submitted" => Self::ProofSubmitted,
            "proof_validated" => Self::ProofValidated,
            "proof_denied" => Self::ProofDenied,
            "initialized" => Self::Initialized,
            "verifier_set" => Self::VerifierSet,
            _ => Self::Unknown,
        }
    }
}

/// Lifecycle state names as stored in the `bounties` projection.
pub mod state {
    pub const OPEN: &str = "open";
    pub const SUBMITTED: &str = "submitted";
    pub const VALIDATED: &str = "validated";
    pub const EXPIRED: &str = "expired";

    /// Normalise a contract `BountyState` variant name (`"Open"`, `"Expired"`, …).
    pub fn from_variant(variant: &str) -> Option<&'static str> {
        match variant.to_ascii_lowercase().as_str() {
            "open" => Some(OPEN),
            "submitted" => Some(SUBMITTED),
            "validated" => Some(VALIDATED),
            "expired" => Some(EXPIRED),
            _ => None,
        }
    }
}

/// A fully decoded bounty event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BountyEvent {
    pub event_type: String,
    pub bounty_id: Option<String>,
    pub actor: Option<String>,
    pub state: Option<String>,
    pub attestation_reference: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub bounty_id: Option<String>,
    pub actor: Option<String>,
    pub state: Option<String>,
    pub attestation_reference: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Projected current view of one bounty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BountyRow {
    pub bounty_id: String,
    pub owner: Option<String>,
    pub contributor: Option<String>,
    pub attestation_reference: Option<String>,
    pub state: String,
    pub submitted_at: Option<i64>,
    pub last_ledger: i64,
    pub updated_at: i64,
}
