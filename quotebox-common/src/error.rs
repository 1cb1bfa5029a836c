//! Common error types for Quotebox

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Common result type for Quotebox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the catalog, ledger and validator
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Submission rejected, one entry per offending field
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Form field a validation failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Text,
    Source,
    Weight,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Text => "text",
            Field::Source => "source",
            Field::Weight => "weight",
        }
    }
}

/// Submission rule violations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    /// Text is empty after whitespace normalization
    EmptyText,
    /// Neither an existing source nor a new source title was given
    MissingSource,
    /// The referenced source id does not exist
    UnknownSource(i64),
    /// The new source's kind is not one of movie, book or other
    InvalidKind(String),
    /// The source already holds the maximum number of quotes
    SourceQuotaExceeded,
    /// Same text (case and whitespace insensitive) already exists for the source
    DuplicateQuote,
    /// Weight below 1 or not a whole number
    InvalidWeight,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyText => write!(f, "Quote text is required."),
            ValidationError::MissingSource => {
                write!(f, "Choose a source or create a new one.")
            }
            ValidationError::UnknownSource(id) => write!(f, "Source {} does not exist.", id),
            ValidationError::InvalidKind(kind) => {
                write!(f, "Select a valid kind; '{}' is not one of the choices.", kind)
            }
            ValidationError::SourceQuotaExceeded => {
                write!(f, "This source already has 3 quotes.")
            }
            ValidationError::DuplicateQuote => {
                write!(f, "This quote already exists for this source.")
            }
            ValidationError::InvalidWeight => write!(f, "Weight must be a positive number."),
        }
    }
}

/// Collected per-field validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<(Field, ValidationError)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, error: ValidationError) {
        self.errors.push((field, error));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Field, ValidationError)> {
        self.errors.iter()
    }

    /// Errors attributed to one field, in the order they were found
    pub fn for_field(&self, field: Field) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.errors.iter().any(|(_, e)| e == error)
    }

    /// `Ok(())` when nothing was collected, otherwise `Error::Validation`
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, error)| format!("{}: {}", field.as_str(), error))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        let field = match error {
            ValidationError::EmptyText | ValidationError::DuplicateQuote => Field::Text,
            ValidationError::InvalidWeight => Field::Weight,
            _ => Field::Source,
        };
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        Error::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Source, ValidationError::SourceQuotaExceeded);
        errors.add(Field::Weight, ValidationError::InvalidWeight);

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.for_field(Field::Source),
            vec![&ValidationError::SourceQuotaExceeded]
        );
        assert!(errors.for_field(Field::Text).is_empty());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_single_error_lands_on_its_field() {
        match Error::from(ValidationError::DuplicateQuote) {
            Error::Validation(errors) => {
                assert_eq!(errors.for_field(Field::Text).len(), 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
