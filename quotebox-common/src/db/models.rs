//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Where a quote comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Movie,
    Book,
    #[default]
    Other,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Movie, SourceKind::Book, SourceKind::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Movie => "movie",
            SourceKind::Book => "book",
            SourceKind::Other => "other",
        }
    }

    /// Human readable label for rendering
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Movie => "Movie",
            SourceKind::Book => "Book",
            SourceKind::Other => "Other",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(SourceKind::Movie),
            "book" => Ok(SourceKind::Book),
            "other" => Ok(SourceKind::Other),
            other => Err(Error::InvalidInput(format!("Unknown source kind: {}", other))),
        }
    }
}

/// Vote value, stored as +1 / -1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    Like,
    Dislike,
}

impl VoteValue {
    pub fn as_i64(&self) -> i64 {
        match self {
            VoteValue::Like => 1,
            VoteValue::Dislike => -1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(VoteValue::Like),
            -1 => Some(VoteValue::Dislike),
            _ => None,
        }
    }
}

impl FromStr for VoteValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(VoteValue::Like),
            "dislike" => Ok(VoteValue::Dislike),
            other => Err(Error::InvalidInput(format!("Unknown vote action: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub title: String,
    pub kind: SourceKind,
    pub created_at: DateTime<Utc>,
}

impl Source {
    pub(crate) fn from_row(row: &SqliteRow) -> crate::Result<Self> {
        let kind: String = row.try_get("kind")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            kind: kind.parse()?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub source_id: i64,
    pub weight: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub(crate) fn from_row(row: &SqliteRow) -> crate::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            text: row.try_get("text")?,
            source_id: row.try_get("source_id")?,
            weight: row.try_get("weight")?,
            views: row.try_get("views")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Quote joined with its owning source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteWithSource {
    pub quote: Quote,
    pub source: Source,
}

impl QuoteWithSource {
    /// Map a row selected with [`QUOTE_WITH_SOURCE_COLUMNS`]
    pub(crate) fn from_row(row: &SqliteRow) -> crate::Result<Self> {
        let kind: String = row.try_get("source_kind")?;
        Ok(Self {
            quote: Quote::from_row(row)?,
            source: Source {
                id: row.try_get("source_id")?,
                title: row.try_get("source_title")?,
                kind: kind.parse()?,
                created_at: row.try_get("source_created_at")?,
            },
        })
    }
}

/// Column list for `quotes q JOIN sources s`
pub(crate) const QUOTE_WITH_SOURCE_COLUMNS: &str = r#"
    q.id, q.text, q.source_id, q.weight, q.views, q.created_at,
    s.title AS source_title, s.kind AS source_kind, s.created_at AS source_created_at
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub quote_id: i64,
    pub session_id: String,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
}

/// Process-wide settings row (id is always 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub show_add_button: bool,
    pub require_login_to_add: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_add_button: true,
            require_login_to_add: false,
        }
    }
}

impl AppSettings {
    /// Whether the Add entry point is offered to this visitor
    pub fn can_add_quotes(&self, is_staff: bool) -> bool {
        self.show_add_button && (!self.require_login_to_add || is_staff)
    }

    /// Whether submission must be gated behind the staff login
    pub fn submission_requires_staff(&self, is_staff: bool) -> bool {
        self.require_login_to_add && !is_staff
    }

    /// One-line summary of the current mode
    pub fn current_mode(&self) -> &'static str {
        if !self.show_add_button {
            "Add button hidden"
        } else if self.require_login_to_add {
            "Staff only"
        } else {
            "Open to everyone"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_round_trip() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
        assert!("film".parse::<SourceKind>().is_err());
        assert_eq!(SourceKind::default(), SourceKind::Other);
    }

    #[test]
    fn test_vote_value_parsing() {
        assert_eq!("like".parse::<VoteValue>().unwrap(), VoteValue::Like);
        assert_eq!("dislike".parse::<VoteValue>().unwrap(), VoteValue::Dislike);
        assert!("LIKE".parse::<VoteValue>().is_err());
        assert_eq!(VoteValue::from_i64(-1), Some(VoteValue::Dislike));
        assert_eq!(VoteValue::from_i64(0), None);
    }

    #[test]
    fn test_settings_modes() {
        let open = AppSettings::default();
        assert!(open.can_add_quotes(false));
        assert!(!open.submission_requires_staff(false));
        assert_eq!(open.current_mode(), "Open to everyone");

        let staff_only = AppSettings {
            show_add_button: true,
            require_login_to_add: true,
        };
        assert!(!staff_only.can_add_quotes(false));
        assert!(staff_only.can_add_quotes(true));
        assert!(staff_only.submission_requires_staff(false));
        assert_eq!(staff_only.current_mode(), "Staff only");

        let hidden = AppSettings {
            show_add_button: false,
            require_login_to_add: false,
        };
        assert!(!hidden.can_add_quotes(true));
        assert_eq!(hidden.current_mode(), "Add button hidden");
    }
}
