//! Soroban RPC client — polls `getEvents` and decodes bounty lifecycle events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{state, BountyEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// XDR-encoded topic list
    pub topic: Vec<String>,
    /// XDR-encoded event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Doubling retry delay, capped at [`MAX_BACKOFF_SECS`].
#[derive(Debug)]
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    /// Sleep for the current delay, then double it.
    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.advance();
    }

    fn advance(&mut self) {
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

/// Invalid-request and method-not-found cannot succeed on retry.
fn is_hard_error(code: i64) -> bool {
    code == -32600 || code == -32601
}

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`BountyEvent`] structs.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<BountyEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

/// Fields pulled out of an event's data payload.
#[derive(Debug, Default, PartialEq, Eq)]
struct EventData {
    actor: Option<String>,
    state: Option<String>,
    attestation_reference: Option<String>,
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<BountyEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let bounty_id = raw.topic.get(1).map(|t| extract_u64_or_raw(t));

    let data = decode_data(&raw.value, &kind);

    Some(BountyEvent {
        event_type: kind.as_str().to_string(),
        bounty_id,
        actor: data.actor,
        state: data.state,
        attestation_reference: data.attestation_reference,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
/// The XDR is decoded by the RPC into a `{"field": …}` JSON object.
fn decode_data(value: &Value, kind: &EventKind) -> EventData {
    match kind {
        EventKind::BountyCreated => EventData {
            actor: extract_field(value, &["owner", "address"])
                .or_else(|| find_nested(value, "owner")),
            state: Some(state::OPEN.to_string()),
            attestation_reference: None,
        },
        EventKind::ProofSubmitted => EventData {
            actor: extract_field(value, &["contributor", "submitter", "address"]),
            state: Some(state::SUBMITTED.to_string()),
            attestation_reference: value
                .get("attestation_reference")
                .and_then(extract_bytes),
        },
        EventKind::ProofValidated => EventData {
            actor: extract_field(value, &["owner", "caller"]),
            state: Some(state::VALIDATED.to_string()),
            attestation_reference: None,
        },
        EventKind::ProofDenied => EventData {
            actor: extract_field(value, &["owner", "caller"]),
            state: value.get("state").and_then(extract_state),
            attestation_reference: None,
        },
        EventKind::Initialized | EventKind::VerifierSet => EventData {
            // Admin events carry a bare address as data.
            actor: value
                .as_str()
                .map(String::from)
                .or_else(|| extract_field(value, &["address"])),
            ..EventData::default()
        },
        EventKind::Unknown => EventData::default(),
    }
}

/// A contract enum variant arrives either as a bare string or as a
/// single-element vector of symbols (`["Expired"]`).
fn extract_state(value: &Value) -> Option<String> {
    let variant = match value {
        Value::String(s) => s.as_str(),
        Value::Array(items) => items.first()?.as_str()?,
        _ => value.get("value")?.as_str()?,
    };
    state::from_variant(variant).map(String::from)
}

/// Normalise a `BytesN<32>` attestation reference to lowercase hex.
/// Accepts hex (as the RPC renders bytes) or base64.
fn extract_bytes(value: &Value) -> Option<String> {
    let raw = value
        .as_str()
        .or_else(|| value.get("bytes").and_then(|v| v.as_str()))?;

    if raw.len() == 64 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(raw.to_ascii_lowercase());
    }
    match base64::engine::general_purpose::STANDARD.decode(raw) {
        Ok(bytes) if bytes.len() == 32 => Some(hex::encode(bytes)),
        _ => Some(raw.to_string()),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => v.as_str().map(String::from),
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

fn find_nested(value: &Value, key: &str) -> Option<String> {
    if let Value::Object(map) = value {
        for (k, v) in map {
            if k == key {
                return v.as_str().map(String::from);
            }
            if let Some(found) = find_nested(v, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Extract a Soroban Symbol from the XDR-decoded topic string.
/// The RPC may return `{"type":"symbol","value":"created"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    // Fallback: treat the raw string as the symbol
    raw.to_string()
}

/// Extract the bounty id from a topic entry that might be a JSON object or raw number/string.
fn extract_u64_or_raw(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(n) = v.get("value").and_then(|x| x.as_u64()) {
            return n.to_string();
        }
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    raw.to_string()
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    // Simple approach: use chrono
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(topic: &[&str], value: Value) -> RawEvent {
        RawEvent {
            topic: topic.iter().map(|t| t.to_string()).collect(),
            value,
            contract_id: Some("CONTRACT1".to_string()),
            tx_hash: Some("TX1".to_string()),
            id: None,
            ledger: Some(1000),
            ledger_closed_at: Some("2024-01-01T00:00:00Z".to_string()),
            in_successful_contract_call: Some(true),
            paging_token: None,
        }
    }

    #[test]
    fn event_kind_from_topic() {
        assert_eq!(EventKind::from_topic("created"), EventKind::BountyCreated);
        assert_eq!(EventKind::from_topic("submitted"), EventKind::ProofSubmitted);
        assert_eq!(EventKind::from_topic("validated"), EventKind::ProofValidated);
        assert_eq!(EventKind::from_topic("denied"), EventKind::ProofDenied);
        assert_eq!(EventKind::from_topic("init"), EventKind::Initialized);
        assert_eq!(EventKind::from_topic("verifier"), EventKind::VerifierSet);
        assert_eq!(EventKind::from_topic("funded"), EventKind::Unknown);
    }

    #[test]
    fn extract_symbol_from_json() {
        let raw = r#"{"type":"symbol","value":"funded"}"#;
        assert_eq!(extract_symbol(raw), "funded");
    }

    #[test]
    fn extract_symbol_raw_fallback() {
        assert_eq!(extract_symbol("verified"), "verified");
    }

    #[test]
    fn decode_created_event() {
        let raw = raw_event(
            &[
                r#"{"type":"symbol","value":"created"}"#,
                r#"{"type":"u64","value":"7"}"#,
            ],
            serde_json::json!({ "id": 7, "owner": "GOWNER", "state": ["Open"] }),
        );

        let events = decode_events(&[raw], "CONTRACT1");
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.event_type, "bounty_created");
        assert_eq!(ev.bounty_id.as_deref(), Some("7"));
        assert_eq!(ev.actor.as_deref(), Some("GOWNER"));
        assert_eq!(ev.state.as_deref(), Some("open"));
        assert_eq!(ev.ledger, 1000);
        assert_eq!(ev.timestamp, 1_704_067_200);
    }

    #[test]
    fn decode_submitted_event_normalises_reference() {
        let reference = "AB".repeat(32);
        let raw = raw_event(
            &[
                r#"{"type":"symbol","value":"submitted"}"#,
                r#"{"type":"u64","value":"3"}"#,
            ],
            serde_json::json!({
                "id": 3,
                "contributor": "GCONTRIB",
                "attestation_reference": reference,
            }),
        );

        let ev = &decode_events(&[raw], "CONTRACT1")[0];
        assert_eq!(ev.event_type, "proof_submitted");
        assert_eq!(ev.actor.as_deref(), Some("GCONTRIB"));
        assert_eq!(ev.state.as_deref(), Some("submitted"));
        assert_eq!(ev.attestation_reference, Some("ab".repeat(32)));
    }

    #[test]
    fn base64_reference_is_hex_encoded() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([0x11u8; 32]);
        assert_eq!(
            extract_bytes(&serde_json::json!(encoded)),
            Some("11".repeat(32))
        );
    }

    #[test]
    fn decode_denied_event_reads_resulting_state() {
        let raw = raw_event(
            &[
                r#"{"type":"symbol","value":"denied"}"#,
                r#"{"type":"u64","value":"3"}"#,
            ],
            serde_json::json!({ "id": 3, "owner": "GOWNER", "state": ["Expired"] }),
        );

        let ev = &decode_events(&[raw], "CONTRACT1")[0];
        assert_eq!(ev.event_type, "proof_denied");
        assert_eq!(ev.actor.as_deref(), Some("GOWNER"));
        assert_eq!(ev.state.as_deref(), Some("expired"));
    }

    #[test]
    fn decode_init_event() {
        let raw = raw_event(
            &[r#"{"type":"symbol","value":"init"}"#],
            serde_json::json!("GADMIN"),
        );

        let ev = &decode_events(&[raw], "CONTRACT1")[0];
        assert_eq!(ev.event_type, "initialized");
        assert_eq!(ev.bounty_id, None);
        assert_eq!(ev.actor.as_deref(), Some("GADMIN"));
    }

    #[test]
    fn failed_contract_calls_are_skipped() {
        let mut raw = raw_event(
            &[r#"{"type":"symbol","value":"validated"}"#, "1"],
            serde_json::json!({ "owner": "GOWNER" }),
        );
        raw.in_successful_contract_call = Some(false);
        assert!(decode_events(&[raw], "CONTRACT1").is_empty());
    }

    #[test]
    fn cursor_replaces_start_ledger() {
        let fresh = build_params("CBOUNTY", 500, None, 100);
        assert_eq!(fresh["startLedger"], 500);
        assert!(fresh["pagination"].get("cursor").is_none());

        let paged = build_params("CBOUNTY", 500, Some("0000-1"), 100);
        assert!(paged.get("startLedger").is_none());
        assert_eq!(paged["pagination"]["cursor"], "0000-1");
        assert_eq!(paged["filters"][0]["contractIds"][0], "CBOUNTY");
    }

    #[test]
    fn only_request_errors_are_hard() {
        assert!(is_hard_error(-32600));
        assert!(is_hard_error(-32601));
        assert!(!is_hard_error(-32603));
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let mut backoff = Backoff::new();
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(backoff.secs);
            backoff.advance();
        }
        assert_eq!(seen, [2, 4, 8, 16, 32, 60, 60]);
    }

    #[test]
    fn parse_iso_timestamp() {
        let ts = parse_iso_to_unix("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, 1_704_067_200);
    }
}
