//! Database schema migrations
//!
//! Versioned changes applied after the base tables exist, tracked in the
//! `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - They must remain stable for databases created by older builds
//! 2. **Always add new migrations** - One function per schema change
//! 3. **Keep them idempotent** - `IF NOT EXISTS` or a `pragma_table_info` check first

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: index for the like/dislike aggregates used by rankings
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add votes(quote_id, value) index");

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_votes_quote_value ON votes(quote_id, value)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Migration v2: index for the newest-first tie break in rankings
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Add quotes(views, created_at) index");

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_quotes_views_created ON quotes(views DESC, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
