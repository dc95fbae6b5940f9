//! Database layer — migrations, queries, cursor management, and the
//! per-bounty projection.

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{info, warn};

use crate::errors::Result;
use crate::events::{state, BountyEvent, BountyRow, EventKind, EventRecord};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Make sure the file is created if it doesn't exist yet.
    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events.  Events that share the same
/// `(ledger, tx_hash, event_type, bounty_id)` tuple are silently ignored
/// to make the indexer idempotent; a missing `tx_hash` or `bounty_id`
/// compares equal to another missing one.  Every newly stored event is folded into
/// the `bounties` projection in the same transaction.
pub async fn insert_events(pool: &SqlitePool, events: &[BountyEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_type, bounty_id, actor, state, attestation_reference,
                 ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ev.event_type)
        .bind(&ev.bounty_id)
        .bind(&ev.actor)
        .bind(&ev.state)
        .bind(&ev.attestation_reference)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected > 0 {
            apply_to_projection(&mut tx, ev).await?;
        }
        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

/// Fold one lifecycle event into the `bounties` table.
async fn apply_to_projection(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    ev: &BountyEvent,
) -> Result<()> {
    let Some(bounty_id) = ev.bounty_id.as_deref() else {
        return Ok(());
    };

    match EventKind::from_stored(&ev.event_type) {
        EventKind::BountyCreated => {
            sqlx::query(
                r#"
                INSERT INTO bounties (bounty_id, owner, state, last_ledger, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (bounty_id) DO UPDATE SET owner = excluded.owner
                "#,
            )
            .bind(bounty_id)
            .bind(&ev.actor)
            .bind(state::OPEN)
            .bind(ev.ledger)
            .bind(ev.timestamp)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::ProofSubmitted => {
            sqlx::query(
                r#"
                INSERT INTO bounties
                    (bounty_id, contributor, attestation_reference, state,
                     submitted_at, last_ledger, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?5)
                ON CONFLICT (bounty_id) DO UPDATE SET
                    contributor           = excluded.contributor,
                    attestation_reference = excluded.attestation_reference,
                    state                 = excluded.state,
                    submitted_at          = excluded.submitted_at,
                    last_ledger           = excluded.last_ledger,
                    updated_at            = excluded.updated_at
                "#,
            )
            .bind(bounty_id)
            .bind(&ev.actor)
            .bind(&ev.attestation_reference)
            .bind(state::SUBMITTED)
            .bind(ev.timestamp)
            .bind(ev.ledger)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::ProofValidated | EventKind::ProofDenied => {
            let Some(next_state) = ev.state.as_deref() else {
                warn!("{} for bounty {bounty_id} carries no state", ev.event_type);
                return Ok(());
            };
            sqlx::query(
                r#"
                INSERT INTO bounties (bounty_id, owner, state, last_ledger, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (bounty_id) DO UPDATE SET
                    state       = excluded.state,
                    last_ledger = excluded.last_ledger,
                    updated_at  = excluded.updated_at
                "#,
            )
            .bind(bounty_id)
            .bind(&ev.actor)
            .bind(next_state)
            .bind(ev.ledger)
            .bind(ev.timestamp)
            .execute(&mut **tx)
            .await?;
        }
        EventKind::Initialized | EventKind::VerifierSet | EventKind::Unknown => {}
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given bounty, ordered by ledger ascending.
pub async fn get_events_for_bounty(pool: &SqlitePool, bounty_id: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, bounty_id, actor, state, attestation_reference,
               ledger, timestamp, contract_id, tx_hash, created_at
        FROM   events
        WHERE  bounty_id = ?1
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(bounty_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, bounty_id, actor, state, attestation_reference,
               ledger, timestamp, contract_id, tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Projection reads
// ─────────────────────────────────────────────────────────

const BOUNTY_COLUMNS: &str = "bounty_id, owner, contributor, attestation_reference, state, \
                              submitted_at, last_ledger, updated_at";

/// Look up one bounty's projected state.
pub async fn get_bounty(pool: &SqlitePool, bounty_id: &str) -> Result<Option<BountyRow>> {
    let row = sqlx::query_as::<_, BountyRow>(&format!(
        "SELECT {BOUNTY_COLUMNS} FROM bounties WHERE bounty_id = ?1"
    ))
    .bind(bounty_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// All projected bounties, optionally restricted to one state, ordered by
/// numeric bounty id.
pub async fn list_bounties(pool: &SqlitePool, state: Option<&str>) -> Result<Vec<BountyRow>> {
    let rows = sqlx::query_as::<_, BountyRow>(&format!(
        "SELECT {BOUNTY_COLUMNS} FROM bounties \
         WHERE ?1 IS NULL OR state = ?1 \
         ORDER BY CAST(bounty_id AS INTEGER) ASC"
    ))
    .bind(state)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
