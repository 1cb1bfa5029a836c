//! Catalog store: sources and quotes
//!
//! Uniqueness (case-insensitive title per kind, case-insensitive text per
//! source) and the per-source quota live in the schema, so the checks here
//! are for friendly errors only; the engine has the final word.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db::models::{Quote, QuoteWithSource, Source, SourceKind, QUOTE_WITH_SOURCE_COLUMNS};
use crate::db::{classify_violation, Violation};
use crate::text::{match_key, normalize_spaces};
use crate::{Error, Result};

/// Quota: maximum quotes attributed to one source
pub const MAX_QUOTES_PER_SOURCE: i64 = 3;

/// Create a source, failing if the same title (any case) already exists for the kind
pub async fn create_source(pool: &SqlitePool, title: &str, kind: SourceKind) -> Result<Source> {
    let title = normalize_spaces(title);
    if title.is_empty() {
        return Err(Error::InvalidInput("Source title cannot be empty".to_string()));
    }

    let row = sqlx::query(
        r#"
        INSERT INTO sources (title, title_key, kind, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, title, kind, created_at
        "#,
    )
    .bind(&title)
    .bind(match_key(&title))
    .bind(kind.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| match classify_violation(&e) {
        Some(Violation::Unique(_)) => {
            Error::InvalidInput(format!("Source already exists: {} ({})", title, kind))
        }
        _ => Error::Database(e),
    })?;

    let source = Source::from_row(&row)?;
    info!("Created source {} '{}' ({})", source.id, source.title, source.kind);
    Ok(source)
}

/// Insert-if-absent, then fetch
///
/// Safe under concurrent callers: the loser of an insert race falls
/// through to the fetch of the winner's row.
pub async fn get_or_create_source(
    conn: &mut SqliteConnection,
    title: &str,
    kind: SourceKind,
) -> Result<Source> {
    let title = normalize_spaces(title);
    if title.is_empty() {
        return Err(Error::InvalidInput("Source title cannot be empty".to_string()));
    }
    let key = match_key(&title);

    let inserted = sqlx::query(
        r#"
        INSERT INTO sources (title, title_key, kind, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (title_key, kind) DO NOTHING
        "#,
    )
    .bind(&title)
    .bind(&key)
    .bind(kind.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let row = sqlx::query(
        "SELECT id, title, kind, created_at FROM sources WHERE title_key = ? AND kind = ?",
    )
    .bind(&key)
    .bind(kind.as_str())
    .fetch_one(&mut *conn)
    .await?;

    let source = Source::from_row(&row)?;
    if inserted > 0 {
        info!("Created source {} '{}' ({})", source.id, source.title, source.kind);
    } else {
        debug!("Reusing source {} '{}' ({})", source.id, source.title, source.kind);
    }
    Ok(source)
}

/// Look a source up by title (case and whitespace insensitive) and kind
pub async fn find_source<'e, E>(executor: E, title: &str, kind: SourceKind) -> Result<Option<Source>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT id, title, kind, created_at FROM sources WHERE title_key = ? AND kind = ?",
    )
    .bind(match_key(title))
    .bind(kind.as_str())
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(Source::from_row).transpose()
}

pub async fn get_source<'e, E>(executor: E, id: i64) -> Result<Option<Source>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT id, title, kind, created_at FROM sources WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(Source::from_row).transpose()
}

/// All sources, alphabetical
pub async fn list_sources(pool: &SqlitePool) -> Result<Vec<Source>> {
    let rows = sqlx::query(
        "SELECT id, title, kind, created_at FROM sources ORDER BY title_key ASC, kind ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(Source::from_row).collect()
}

/// Delete a source together with its quotes and their votes
///
/// Returns false if the source did not exist.
pub async fn delete_source(pool: &SqlitePool, id: i64) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM sources WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted > 0 {
        info!("Deleted source {} (quotes and votes cascaded)", id);
    }
    Ok(deleted > 0)
}

/// Quote with its source
pub async fn get_quote<'e, E>(executor: E, id: i64) -> Result<Option<QuoteWithSource>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM quotes q JOIN sources s ON s.id = q.source_id WHERE q.id = ?",
        QUOTE_WITH_SOURCE_COLUMNS
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;

    row.as_ref().map(QuoteWithSource::from_row).transpose()
}

pub async fn quote_exists<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quotes WHERE id = ?)")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(exists)
}

/// Quotes attributed to one source, oldest first
pub async fn quotes_for_source(pool: &SqlitePool, source_id: i64) -> Result<Vec<Quote>> {
    let rows = sqlx::query(
        r#"
        SELECT id, text, source_id, weight, views, created_at
        FROM quotes
        WHERE source_id = ?
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(source_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Quote::from_row).collect()
}

/// (id, weight) pairs for the whole catalog
pub async fn quote_ids_and_weights(pool: &SqlitePool) -> Result<Vec<(i64, i64)>> {
    let pairs = sqlx::query_as::<_, (i64, i64)>("SELECT id, weight FROM quotes ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(pairs)
}

/// Number of quotes attributed to a source, optionally ignoring one quote
pub async fn count_quotes_for_source<'e, E>(
    executor: E,
    source_id: i64,
    exclude_quote_id: Option<i64>,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM quotes WHERE source_id = ? AND (? IS NULL OR id != ?)",
    )
    .bind(source_id)
    .bind(exclude_quote_id)
    .bind(exclude_quote_id)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

/// Whether the source already has this text (case and whitespace insensitive)
pub async fn source_has_text<'e, E>(
    executor: E,
    source_id: i64,
    text: &str,
    exclude_quote_id: Option<i64>,
) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM quotes
            WHERE source_id = ? AND text_key = ? AND (? IS NULL OR id != ?)
        )
        "#,
    )
    .bind(source_id)
    .bind(match_key(text))
    .bind(exclude_quote_id)
    .bind(exclude_quote_id)
    .fetch_one(executor)
    .await?;
    Ok(exists)
}

/// Raw insert; callers translate constraint violations
pub(crate) async fn insert_quote(
    conn: &mut SqliteConnection,
    text: &str,
    source_id: i64,
    weight: i64,
) -> Result<Quote> {
    let row = sqlx::query(
        r#"
        INSERT INTO quotes (text, text_key, source_id, weight, views, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        RETURNING id, text, source_id, weight, views, created_at
        "#,
    )
    .bind(text)
    .bind(match_key(text))
    .bind(source_id)
    .bind(weight)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Quote::from_row(&row)
}

/// Raw update of an existing quote; callers translate constraint violations
pub(crate) async fn update_quote_row(
    conn: &mut SqliteConnection,
    quote_id: i64,
    text: &str,
    source_id: i64,
    weight: i64,
) -> Result<Option<Quote>> {
    let row = sqlx::query(
        r#"
        UPDATE quotes
        SET text = ?, text_key = ?, source_id = ?, weight = ?
        WHERE id = ?
        RETURNING id, text, source_id, weight, views, created_at
        "#,
    )
    .bind(text)
    .bind(match_key(text))
    .bind(source_id)
    .bind(weight)
    .bind(quote_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(Quote::from_row).transpose()
}

/// Count one view, atomically
///
/// Relative update, so concurrent viewers never lose increments. Returns the
/// new view count, or None if the quote is gone.
pub async fn record_view(pool: &SqlitePool, quote_id: i64) -> Result<Option<i64>> {
    let views: Option<i64> =
        sqlx::query_scalar("UPDATE quotes SET views = views + 1 WHERE id = ? RETURNING views")
            .bind(quote_id)
            .fetch_optional(pool)
            .await?;
    Ok(views)
}

/// Delete a quote and its votes; false if it did not exist
pub async fn delete_quote(pool: &SqlitePool, id: i64) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM quotes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted > 0 {
        info!("Deleted quote {}", id);
    }
    Ok(deleted > 0)
}
