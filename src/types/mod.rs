// src/types/mod.rs
//! Validated domain types.

mod ids;

pub use ids::{parse_id, NotionId};

use thiserror::Error;

/// Validation failures for user-supplied identifiers and values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Could not extract Notion ID from URL: {0}")]
    UnparseableId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),
}
