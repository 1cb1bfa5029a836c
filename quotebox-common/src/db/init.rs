//! Database initialization
//!
//! Opens (or creates) the SQLite store and makes sure every table, index,
//! trigger and the settings row exist before the first request is served.
//! All statements are idempotent, so this runs on every startup.

use crate::catalog::MAX_QUOTES_PER_SOURCE;
use crate::db::QUOTA_TRIGGER_MESSAGE;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout so concurrent writers queue instead of failing with SQLITE_BUSY
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Foreign keys are a per-connection setting, so they go on the connect
    // options rather than a one-off PRAGMA against the pool
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    prepare_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database (tests and throwaway runs)
///
/// The pool keeps its one connection alive forever; dropping it would
/// discard the database.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    prepare_schema(&pool).await?;

    Ok(pool)
}

async fn prepare_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_sources_table(pool).await?;
    create_quotes_table(pool).await?;
    create_quota_triggers(pool).await?;
    create_votes_table(pool).await?;
    create_app_settings_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    // The settings row is also created lazily on read; doing it here keeps
    // the first request from racing other first requests.
    crate::settings::get_or_create(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Sources: (title_key, kind) unique, title_key is the case-folded title
async fn create_sources_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            title_key TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'other' CHECK (kind IN ('movie', 'book', 'other')),
            created_at TIMESTAMP NOT NULL,
            CONSTRAINT uq_source_title_kind_ci UNIQUE (title_key, kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Quotes: (text_key, source_id) unique, cascade on source delete
async fn create_quotes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quotes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            text_key TEXT NOT NULL,
            source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            weight INTEGER NOT NULL DEFAULT 1 CHECK (weight >= 1),
            views INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
            created_at TIMESTAMP NOT NULL,
            CONSTRAINT uq_quote_text_source_ci UNIQUE (text_key, source_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quotes_source ON quotes(source_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Per-source quota enforced by the engine for inserts and re-parenting updates
async fn create_quota_triggers(pool: &SqlitePool) -> Result<()> {
    let insert_trigger = format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS trg_quotes_source_quota_insert
        BEFORE INSERT ON quotes
        WHEN (SELECT COUNT(*) FROM quotes WHERE source_id = NEW.source_id) >= {max}
        BEGIN
            SELECT RAISE(ABORT, '{message}');
        END
        "#,
        max = MAX_QUOTES_PER_SOURCE,
        message = QUOTA_TRIGGER_MESSAGE,
    );
    sqlx::query(&insert_trigger).execute(pool).await?;

    let update_trigger = format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS trg_quotes_source_quota_update
        BEFORE UPDATE OF source_id ON quotes
        WHEN NEW.source_id != OLD.source_id
          AND (SELECT COUNT(*) FROM quotes WHERE source_id = NEW.source_id) >= {max}
        BEGIN
            SELECT RAISE(ABORT, '{message}');
        END
        "#,
        max = MAX_QUOTES_PER_SOURCE,
        message = QUOTA_TRIGGER_MESSAGE,
    );
    sqlx::query(&update_trigger).execute(pool).await?;

    Ok(())
}

/// Votes: one row per (quote, session), cascade on quote delete
async fn create_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            quote_id INTEGER NOT NULL REFERENCES quotes(id) ON DELETE CASCADE,
            session_id TEXT NOT NULL,
            value INTEGER NOT NULL CHECK (value IN (1, -1)),
            created_at TIMESTAMP NOT NULL,
            CONSTRAINT uq_vote_quote_session UNIQUE (quote_id, session_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Settings singleton: the CHECK makes a second row impossible
async fn create_app_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS app_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            show_add_button INTEGER NOT NULL DEFAULT 1,
            require_login_to_add INTEGER NOT NULL DEFAULT 0,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
