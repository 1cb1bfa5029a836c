//! # Quotebox Common Library
//!
//! Core of the quote service, shared by the web front end:
//! - Storage bootstrap and models (sources, quotes, votes, settings)
//! - Catalog store with case-insensitive uniqueness and the per-source quota
//! - Weighted random selection and view bookkeeping
//! - Vote ledger (one vote per quote and session)
//! - Submission validation
//! - Rankings and dashboard breakdowns
//! - Configuration loading

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod ranking;
pub mod selection;
pub mod settings;
pub mod staff;
pub mod submission;
pub mod text;
pub mod votes;

pub use db::models::{AppSettings, Quote, QuoteWithSource, Source, SourceKind, VoteValue};
pub use error::{Error, Field, Result, ValidationError, ValidationErrors};
