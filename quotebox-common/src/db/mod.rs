//! Database bootstrap, models and constraint handling

pub mod init;
pub mod migrations;
pub mod models;

pub use init::{init_database, init_in_memory};
pub use migrations::run_migrations;

use sqlx::error::ErrorKind;

/// Message raised by the quota triggers
pub(crate) const QUOTA_TRIGGER_MESSAGE: &str = "source_quota_exceeded";

/// Storage constraint that rejected a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Violation {
    /// UNIQUE index, carrying the table it fired on
    Unique(String),
    /// Per-source quota trigger
    Quota,
    ForeignKey,
    Check,
}

/// Classify a sqlx error as a constraint violation, if it is one
pub(crate) fn classify_violation(err: &sqlx::Error) -> Option<Violation> {
    let db_err = match err {
        sqlx::Error::Database(db_err) => db_err,
        _ => return None,
    };

    let message = db_err.message();
    if message.contains(QUOTA_TRIGGER_MESSAGE) {
        return Some(Violation::Quota);
    }

    match db_err.kind() {
        ErrorKind::UniqueViolation => {
            // "UNIQUE constraint failed: quotes.text_key, quotes.source_id"
            let table = message
                .rsplit(':')
                .next()
                .and_then(|cols| cols.trim().split('.').next())
                .unwrap_or_default()
                .to_string();
            Some(Violation::Unique(table))
        }
        ErrorKind::ForeignKeyViolation => Some(Violation::ForeignKey),
        ErrorKind::CheckViolation => Some(Violation::Check),
        _ => None,
    }
}
