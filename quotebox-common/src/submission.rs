//! Quote submission validation
//!
//! Rules, in the order they are reported:
//! 1. Text is whitespace-normalized and must not be empty
//! 2. The source is an existing id, or a new title resolved get-or-create
//!    (kind defaults to `other`)
//! 3. The source holds fewer than [`MAX_QUOTES_PER_SOURCE`] other quotes
//! 4. New submissions must not repeat a text already on the source
//!    (case and whitespace insensitive); edits skip this check
//! 5. Weight is at least 1 (missing means 1)
//!
//! Every violation that can be detected is collected before returning.
//! A race that slips past the checks is caught by the schema's unique
//! index or quota trigger and reported with the same variants.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::catalog::{self, MAX_QUOTES_PER_SOURCE};
use crate::db::models::{Quote, Source, SourceKind};
use crate::db::{classify_violation, Violation};
use crate::text::normalize_spaces;
use crate::{Error, Field, Result, ValidationError, ValidationErrors};

/// Which source the submitter picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    /// An id from the source list
    Existing(i64),
    /// A source to reuse or create by title
    New {
        title: String,
        kind: Option<SourceKind>,
    },
    /// A new title with a kind outside movie, book and other
    InvalidKind(String),
    /// Nothing given
    Unspecified,
}

impl SourceChoice {
    /// Build from raw form fields; an existing id wins over a new title
    ///
    /// Blank fields count as absent. A non-numeric id is ignored; an unknown
    /// kind is kept so validation can report it against the source field.
    pub fn from_form(
        source_id: Option<&str>,
        new_title: Option<&str>,
        new_kind: Option<&str>,
    ) -> Self {
        if let Some(id) = source_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<i64>().ok())
        {
            return SourceChoice::Existing(id);
        }

        let title = new_title.map(normalize_spaces).unwrap_or_default();
        if title.is_empty() {
            return SourceChoice::Unspecified;
        }

        match new_kind.map(str::trim).filter(|s| !s.is_empty()) {
            None => SourceChoice::New { title, kind: None },
            Some(raw) => match raw.parse::<SourceKind>() {
                Ok(kind) => SourceChoice::New {
                    title,
                    kind: Some(kind),
                },
                Err(_) => SourceChoice::InvalidKind(raw.to_string()),
            },
        }
    }
}

/// Weight as submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightInput {
    Default,
    Value(i64),
    /// Not a whole number
    Malformed(String),
}

impl WeightInput {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => WeightInput::Default,
            Some(s) => match s.parse::<i64>() {
                Ok(value) => WeightInput::Value(value),
                Err(_) => WeightInput::Malformed(s.to_string()),
            },
        }
    }
}

impl From<Option<i64>> for WeightInput {
    fn from(value: Option<i64>) -> Self {
        value.map_or(WeightInput::Default, WeightInput::Value)
    }
}

/// A quote submission (new or edit)
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub text: String,
    pub source: SourceChoice,
    pub weight: WeightInput,
}

/// Validate and store a new quote
pub async fn submit_quote(pool: &SqlitePool, request: SubmissionRequest) -> Result<Quote> {
    save(pool, request, None).await
}

/// Validate and apply an edit to an existing quote
///
/// The quota ignores the quote itself. Edits are not duplicate-checked
/// against the source's other quotes; a collision still fails on the
/// unique index and comes back as `DuplicateQuote`.
pub async fn update_quote(
    pool: &SqlitePool,
    quote_id: i64,
    request: SubmissionRequest,
) -> Result<Quote> {
    if !catalog::quote_exists(pool, quote_id).await? {
        return Err(Error::NotFound(format!("Quote {}", quote_id)));
    }
    save(pool, request, Some(quote_id)).await
}

/// Source after lookup, before anything is written
enum Resolved {
    Existing(Source),
    /// Title not seen yet for this kind; created together with the quote
    Pending { title: String, kind: SourceKind },
}

async fn save(pool: &SqlitePool, request: SubmissionRequest, editing: Option<i64>) -> Result<Quote> {
    let mut errors = ValidationErrors::new();

    let text = normalize_spaces(&request.text);
    if text.is_empty() {
        errors.add(Field::Text, ValidationError::EmptyText);
    }

    let resolved = resolve_source(pool, &request.source, &mut errors).await?;

    if let Some(Resolved::Existing(source)) = &resolved {
        let taken = catalog::count_quotes_for_source(pool, source.id, editing).await?;
        if taken >= MAX_QUOTES_PER_SOURCE {
            errors.add(Field::Source, ValidationError::SourceQuotaExceeded);
        }

        if editing.is_none()
            && !text.is_empty()
            && catalog::source_has_text(pool, source.id, &text, None).await?
        {
            errors.add(Field::Text, ValidationError::DuplicateQuote);
        }
    }

    let weight = match request.weight {
        WeightInput::Default => 1,
        WeightInput::Value(value) if value >= 1 => value,
        WeightInput::Value(_) | WeightInput::Malformed(_) => {
            errors.add(Field::Weight, ValidationError::InvalidWeight);
            1
        }
    };

    errors.into_result()?;
    let resolved = resolved.ok_or_else(|| Error::Internal("Source unresolved".to_string()))?;

    // Writes only from here on: the first statement takes the write lock,
    // so the busy timeout applies instead of a snapshot upgrade failure
    let mut tx = pool.begin().await?;

    let source = match resolved {
        Resolved::Existing(source) => source,
        Resolved::Pending { title, kind } => {
            catalog::get_or_create_source(&mut *tx, &title, kind).await?
        }
    };

    let written = match editing {
        None => catalog::insert_quote(&mut *tx, &text, source.id, weight)
            .await
            .map(Some),
        Some(quote_id) => {
            catalog::update_quote_row(&mut *tx, quote_id, &text, source.id, weight).await
        }
    };

    let quote = match written {
        Ok(Some(quote)) => quote,
        Ok(None) => {
            return Err(Error::NotFound(format!(
                "Quote {}",
                editing.unwrap_or_default()
            )))
        }
        Err(err) => return Err(translate_violation(err, source.id)),
    };

    tx.commit().await?;

    match editing {
        None => info!(
            "Created quote {} for source {} '{}' (weight {})",
            quote.id, source.id, source.title, quote.weight
        ),
        Some(_) => info!("Updated quote {} (source {})", quote.id, source.id),
    }
    Ok(quote)
}

async fn resolve_source(
    pool: &SqlitePool,
    choice: &SourceChoice,
    errors: &mut ValidationErrors,
) -> Result<Option<Resolved>> {
    match choice {
        SourceChoice::Existing(id) => match catalog::get_source(pool, *id).await? {
            Some(source) => Ok(Some(Resolved::Existing(source))),
            None => {
                errors.add(Field::Source, ValidationError::UnknownSource(*id));
                Ok(None)
            }
        },
        SourceChoice::New { title, kind } => {
            let title = normalize_spaces(title);
            if title.is_empty() {
                errors.add(Field::Source, ValidationError::MissingSource);
                return Ok(None);
            }
            let kind = kind.unwrap_or_default();
            match catalog::find_source(pool, &title, kind).await? {
                Some(source) => Ok(Some(Resolved::Existing(source))),
                None => Ok(Some(Resolved::Pending { title, kind })),
            }
        }
        SourceChoice::InvalidKind(raw) => {
            errors.add(Field::Source, ValidationError::InvalidKind(raw.clone()));
            Ok(None)
        }
        SourceChoice::Unspecified => {
            errors.add(Field::Source, ValidationError::MissingSource);
            Ok(None)
        }
    }
}

/// Map a storage constraint failure onto the validation taxonomy
fn translate_violation(err: Error, source_id: i64) -> Error {
    let violation = match &err {
        Error::Database(db_err) => classify_violation(db_err),
        _ => None,
    };

    let translated = match violation {
        Some(Violation::Quota) => ValidationError::SourceQuotaExceeded,
        Some(Violation::Unique(table)) if table == "quotes" => ValidationError::DuplicateQuote,
        Some(Violation::Check) => ValidationError::InvalidWeight,
        Some(Violation::ForeignKey) => ValidationError::UnknownSource(source_id),
        _ => return err,
    };

    warn!(
        "Constraint rejected quote write for source {}: {}",
        source_id, translated
    );
    translated.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_choice_prefers_existing_id() {
        let choice = SourceChoice::from_form(Some("4"), Some("Dune"), Some("book"));
        assert_eq!(choice, SourceChoice::Existing(4));
    }

    #[test]
    fn test_source_choice_new_title_normalized() {
        let choice = SourceChoice::from_form(Some(""), Some("  The   Hobbit "), None);
        assert_eq!(
            choice,
            SourceChoice::New {
                title: "The Hobbit".to_string(),
                kind: None
            }
        );
    }

    #[test]
    fn test_source_choice_blank_is_unspecified() {
        let choice = SourceChoice::from_form(None, Some("   "), Some("movie"));
        assert_eq!(choice, SourceChoice::Unspecified);
    }

    #[test]
    fn test_source_choice_keeps_unknown_kind() {
        assert_eq!(
            SourceChoice::from_form(None, Some("Alien"), Some("film")),
            SourceChoice::InvalidKind("film".to_string())
        );
    }

    #[test]
    fn test_weight_input_parsing() {
        assert_eq!(WeightInput::parse(None), WeightInput::Default);
        assert_eq!(WeightInput::parse(Some(" ")), WeightInput::Default);
        assert_eq!(WeightInput::parse(Some("3")), WeightInput::Value(3));
        assert_eq!(WeightInput::parse(Some("-2")), WeightInput::Value(-2));
        assert_eq!(
            WeightInput::parse(Some("two")),
            WeightInput::Malformed("two".to_string())
        );
    }

    fn single_error(err: Error) -> ValidationError {
        match err {
            Error::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                errors.iter().next().map(|(_, e)| e.clone()).unwrap()
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quota_trigger_translated() {
        let pool = crate::db::init_in_memory().await.unwrap();
        let source = catalog::create_source(&pool, "Heat", SourceKind::Movie)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        for i in 0..MAX_QUOTES_PER_SOURCE {
            catalog::insert_quote(&mut *conn, &format!("Line {}", i), source.id, 1)
                .await
                .unwrap();
        }
        let err = catalog::insert_quote(&mut *conn, "One too many", source.id, 1)
            .await
            .unwrap_err();

        assert_eq!(
            single_error(translate_violation(err, source.id)),
            ValidationError::SourceQuotaExceeded
        );
    }

    #[tokio::test]
    async fn test_unique_index_translated() {
        let pool = crate::db::init_in_memory().await.unwrap();
        let source = catalog::create_source(&pool, "Heat", SourceKind::Movie)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        catalog::insert_quote(&mut *conn, "Don't let yourself get attached.", source.id, 1)
            .await
            .unwrap();
        let err = catalog::insert_quote(&mut *conn, "DON'T let yourself get attached.", source.id, 1)
            .await
            .unwrap_err();

        assert_eq!(
            single_error(translate_violation(err, source.id)),
            ValidationError::DuplicateQuote
        );
    }
}
