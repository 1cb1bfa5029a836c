//! Vote ledger: at most one vote per (quote, session)
//!
//! A session may flip its vote; the row is updated in place, so there is
//! no history and nothing is double counted.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::catalog;
use crate::db::models::{Vote, VoteValue};
use crate::db::{classify_violation, Violation};
use crate::{Error, Result};

/// What `cast_vote` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Created,
    Changed,
    Unchanged,
}

/// Record `action` ("like" / "dislike") for the session
pub async fn cast_vote(
    pool: &SqlitePool,
    quote_id: i64,
    session_id: &str,
    action: &str,
) -> Result<VoteOutcome> {
    let value: VoteValue = action.parse()?;
    if session_id.is_empty() {
        return Err(Error::InvalidInput("Missing session identifier".to_string()));
    }
    if !catalog::quote_exists(pool, quote_id).await? {
        return Err(Error::NotFound(format!("Quote {}", quote_id)));
    }

    record_vote(pool, quote_id, session_id, value).await
}

/// Ledger write with an already-parsed value
///
/// Two statements, each atomic: insert-if-absent, then a conditional
/// update. Concurrent flips from one session resolve last-writer-wins.
pub async fn record_vote(
    pool: &SqlitePool,
    quote_id: i64,
    session_id: &str,
    value: VoteValue,
) -> Result<VoteOutcome> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO votes (quote_id, session_id, value, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (quote_id, session_id) DO NOTHING
        "#,
    )
    .bind(quote_id)
    .bind(session_id)
    .bind(value.as_i64())
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| match classify_violation(&e) {
        // Quote deleted after the existence check
        Some(Violation::ForeignKey) => Error::NotFound(format!("Quote {}", quote_id)),
        _ => Error::Database(e),
    })?
    .rows_affected();

    if inserted > 0 {
        info!("Vote {:?} on quote {} by session {}", value, quote_id, session_id);
        return Ok(VoteOutcome::Created);
    }

    let changed = sqlx::query(
        "UPDATE votes SET value = ? WHERE quote_id = ? AND session_id = ? AND value != ?",
    )
    .bind(value.as_i64())
    .bind(quote_id)
    .bind(session_id)
    .bind(value.as_i64())
    .execute(pool)
    .await?
    .rows_affected();

    if changed > 0 {
        info!("Vote on quote {} by session {} changed to {:?}", quote_id, session_id, value);
        Ok(VoteOutcome::Changed)
    } else {
        debug!("Vote on quote {} by session {} unchanged", quote_id, session_id);
        Ok(VoteOutcome::Unchanged)
    }
}

/// (likes, dislikes) for one quote
pub async fn count_likes_dislikes(pool: &SqlitePool, quote_id: i64) -> Result<(i64, i64)> {
    let row = sqlx::query(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN value = 1 THEN 1 ELSE 0 END), 0) AS likes,
            COALESCE(SUM(CASE WHEN value = -1 THEN 1 ELSE 0 END), 0) AS dislikes
        FROM votes
        WHERE quote_id = ?
        "#,
    )
    .bind(quote_id)
    .fetch_one(pool)
    .await?;

    Ok((row.try_get("likes")?, row.try_get("dislikes")?))
}

/// The session's current vote on a quote, if any
pub async fn get_vote(pool: &SqlitePool, quote_id: i64, session_id: &str) -> Result<Option<Vote>> {
    let row = sqlx::query(
        r#"
        SELECT id, quote_id, session_id, value, created_at
        FROM votes
        WHERE quote_id = ? AND session_id = ?
        "#,
    )
    .bind(quote_id)
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let raw: i64 = row.try_get("value")?;
    let value = VoteValue::from_i64(raw)
        .ok_or_else(|| Error::Internal(format!("Stored vote value out of range: {}", raw)))?;

    Ok(Some(Vote {
        id: row.try_get("id")?,
        quote_id: row.try_get("quote_id")?,
        session_id: row.try_get("session_id")?,
        value,
        created_at: row.try_get("created_at")?,
    }))
}
