//! AppSettings singleton
//!
//! One row, id fixed to 1, guarded by `CHECK (id = 1)`. Creation is
//! `INSERT OR IGNORE`, so concurrent first reads cannot produce two rows.
//!
//! # Caching
//!
//! Read on every page render and every submission, written almost never.
//! [`SettingsCache`] keeps the last loaded value behind an `RwLock`
//! (readers don't block each other); writers go through
//! [`SettingsCache::update`] or [`SettingsCache::patch`], which persist
//! and then reload.

use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::db::models::AppSettings;
use crate::Result;

/// Fetch the settings row, creating it with defaults if absent
pub async fn get_or_create(pool: &SqlitePool) -> Result<AppSettings> {
    let defaults = AppSettings::default();
    sqlx::query(
        "INSERT OR IGNORE INTO app_settings (id, show_add_button, require_login_to_add) VALUES (1, ?, ?)",
    )
    .bind(defaults.show_add_button)
    .bind(defaults.require_login_to_add)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT show_add_button, require_login_to_add FROM app_settings WHERE id = 1")
        .fetch_one(pool)
        .await?;

    Ok(AppSettings {
        show_add_button: row.try_get("show_add_button")?,
        require_login_to_add: row.try_get("require_login_to_add")?,
    })
}

/// Persist new settings (upsert on id 1)
pub async fn save(pool: &SqlitePool, settings: &AppSettings) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO app_settings (id, show_add_button, require_login_to_add, updated_at)
        VALUES (1, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT (id) DO UPDATE SET
            show_add_button = excluded.show_add_button,
            require_login_to_add = excluded.require_login_to_add,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(settings.show_add_button)
    .bind(settings.require_login_to_add)
    .execute(pool)
    .await?;

    info!(
        "Settings saved: show_add_button={}, require_login_to_add={}",
        settings.show_add_button, settings.require_login_to_add
    );
    Ok(())
}

/// Partial change; `None` leaves the stored column as it is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    pub show_add_button: Option<bool>,
    pub require_login_to_add: Option<bool>,
}

/// Apply a partial change in one statement
///
/// Unset fields are resolved against the row inside the UPDATE, so
/// concurrent patches to different fields both land.
pub async fn apply_patch(pool: &SqlitePool, patch: &SettingsPatch) -> Result<AppSettings> {
    get_or_create(pool).await?;

    let row = sqlx::query(
        r#"
        UPDATE app_settings SET
            show_add_button = COALESCE(?, show_add_button),
            require_login_to_add = COALESCE(?, require_login_to_add),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = 1
        RETURNING show_add_button, require_login_to_add
        "#,
    )
    .bind(patch.show_add_button)
    .bind(patch.require_login_to_add)
    .fetch_one(pool)
    .await?;

    let settings = AppSettings {
        show_add_button: row.try_get("show_add_button")?,
        require_login_to_add: row.try_get("require_login_to_add")?,
    };
    info!(
        "Settings patched: show_add_button={}, require_login_to_add={}",
        settings.show_add_button, settings.require_login_to_add
    );
    Ok(settings)
}

/// Read-mostly in-process copy of the settings row
#[derive(Clone, Default)]
pub struct SettingsCache {
    inner: Arc<RwLock<Option<AppSettings>>>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached settings, loading (and creating) the row on first use
    pub async fn get(&self, pool: &SqlitePool) -> Result<AppSettings> {
        if let Some(settings) = self.cached() {
            return Ok(settings);
        }
        self.reload(pool).await
    }

    /// Re-read the row, replacing whatever was cached
    pub async fn reload(&self, pool: &SqlitePool) -> Result<AppSettings> {
        let settings = get_or_create(pool).await?;
        self.store(settings);
        info!("Settings reloaded: mode = {}", settings.current_mode());
        Ok(settings)
    }

    /// Persist and refresh the cache
    pub async fn update(&self, pool: &SqlitePool, settings: AppSettings) -> Result<AppSettings> {
        save(pool, &settings).await?;
        self.reload(pool).await
    }

    /// Apply a partial change and refresh the cache
    pub async fn patch(&self, pool: &SqlitePool, patch: &SettingsPatch) -> Result<AppSettings> {
        apply_patch(pool, patch).await?;
        self.reload(pool).await
    }

    /// Drop the cached copy; the next `get` reads the database
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }

    fn cached(&self) -> Option<AppSettings> {
        self.inner.read().ok().and_then(|guard| *guard)
    }

    fn store(&self, settings: AppSettings) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(settings);
        }
    }
}
