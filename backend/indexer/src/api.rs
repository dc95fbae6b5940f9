//! Axum REST API handlers: read-only views over indexed bounty events and
//! the per-bounty projection.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{state as bounty_state, BountyRow, EventRecord};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub bounty_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct BountiesResponse {
    pub count: usize,
    pub bounties: Vec<BountyRow>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        let status = match self {
            IndexerError::InvalidBountyId(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self)
    }
}

/// Bounty ids are `u64` on chain; reject anything else before touching the DB.
fn parse_bounty_id(raw: &str) -> Result<String, IndexerError> {
    raw.parse::<u64>()
        .map(|id| id.to_string())
        .map_err(|_| IndexerError::InvalidBountyId(raw.to_string()))
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
///
/// Returns all indexed events across all bounties.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(AllEventsResponse { count, events })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `GET /bounties/:id/events`
///
/// Returns the full event history of one bounty.
pub async fn get_bounty_events(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let bounty_id = match parse_bounty_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match db::get_events_for_bounty(&state.pool, &bounty_id).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(EventsResponse {
                    bounty_id,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `GET /bounties/:id`
pub async fn get_bounty(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let bounty_id = match parse_bounty_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match db::get_bounty(&state.pool, &bounty_id).await {
        Ok(Some(bounty)) => (StatusCode::OK, Json(bounty)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("bounty {bounty_id} not found"),
        ),
        Err(e) => e.into_response(),
    }
}

/// `GET /bounties`
pub async fn list_bounties(State(state): State<Arc<ApiState>>) -> Response {
    bounties_response(&state.pool, None).await
}

/// `GET /bounties/open`
pub async fn list_open_bounties(State(state): State<Arc<ApiState>>) -> Response {
    bounties_response(&state.pool, Some(bounty_state::OPEN)).await
}

async fn bounties_response(pool: &SqlitePool, filter: Option<&str>) -> Response {
    match db::list_bounties(pool, filter).await {
        Ok(bounties) => {
            let count = bounties.len();
            (StatusCode::OK, Json(BountiesResponse { count, bounties })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::events::{BountyEvent, EventKind};

    async fn test_state() -> Arc<ApiState> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::migrate(&pool).await.unwrap();
        db::insert_events(
            &pool,
            &[BountyEvent {
                event_type: EventKind::BountyCreated.as_str().to_string(),
                bounty_id: Some("1".to_string()),
                actor: Some("GOWNER".to_string()),
                state: Some(bounty_state::OPEN.to_string()),
                attestation_reference: None,
                ledger: 100,
                timestamp: 1_700_000_000,
                contract_id: "CBOUNTY".to_string(),
                tx_hash: Some("tx-100".to_string()),
            }],
        )
        .await
        .unwrap();
        Arc::new(ApiState { pool })
    }

    #[test]
    fn bounty_id_must_be_numeric() {
        assert_eq!(parse_bounty_id("0042").unwrap(), "42");
        assert!(matches!(
            parse_bounty_id("abc"),
            Err(IndexerError::InvalidBountyId(_))
        ));
    }

    #[tokio::test]
    async fn known_bounty_is_ok() {
        let state = test_state().await;
        let response = get_bounty(State(state), Path("1".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_bounty_is_not_found() {
        let state = test_state().await;
        let response = get_bounty(State(state), Path("2".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_bounty_id_is_bad_request() {
        let state = test_state().await;
        let response = get_bounty_events(State(state), Path("one".to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn open_listing_is_ok() {
        let state = test_state().await;
        let response = list_open_bounties(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
