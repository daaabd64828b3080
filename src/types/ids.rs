// src/types/ids.rs
//! Notion identifiers and the normalizer that extracts them from URLs.

use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

lazy_static::lazy_static! {
    static ref TRAILING_ID: Regex = Regex::new(
        r"(?i)([a-f0-9]{32})$|([a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})$"
    ).expect("Failed to compile trailing Notion ID regex - this is a bug in the code");

    static ref TRAILING_COMPACT_ID: Regex = Regex::new(r"(?i)([a-f0-9]{32})$")
        .expect("Failed to compile compact Notion ID regex - this is a bug in the code");
}

/// Extracts a Notion identifier from a raw id or a Notion URL.
///
/// Anything that does not start with `http` is treated as an id and only
/// has its dashes removed. For URLs the last non-empty path segment must
/// end in a 32-hex-digit id (dashed or not). Matching is case-insensitive
/// and the matched digits keep their original case.
pub fn parse_id(input: &str) -> Result<String, ValidationError> {
    if !input.starts_with("http") {
        return Ok(input.replace('-', ""));
    }

    let url = url::Url::parse(input).map_err(|e| ValidationError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;

    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    if let Some(found) = TRAILING_ID
        .captures(last_segment)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
    {
        return Ok(found.as_str().replace('-', ""));
    }

    let compact = last_segment.replace('-', "");
    if let Some(found) = TRAILING_COMPACT_ID.captures(&compact).and_then(|caps| caps.get(1)) {
        return Ok(found.as_str().to_string());
    }

    Err(ValidationError::UnparseableId(input.to_string()))
}

/// A normalized Notion object id (dashes removed).
///
/// Used as the cache key and, hyphenated, as the path parameter for API
/// calls. Construction goes through [`parse_id`] so URLs are accepted
/// wherever an id is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotionId(String);

impl NotionId {
    /// Parse a raw id or Notion URL into a normalized id.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("notion id"));
        }
        let normalized = parse_id(trimmed)?;
        if normalized.is_empty() {
            return Err(ValidationError::EmptyField("notion id"));
        }
        Ok(Self(normalized))
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical 8-4-4-4-12 form for API paths.
    ///
    /// Ids that are not 32 hex digits are passed through untouched and
    /// left for the API to reject.
    pub fn to_hyphenated(&self) -> String {
        match Uuid::try_parse(&self.0) {
            Ok(uuid) => uuid.hyphenated().to_string(),
            Err(_) => self.0.clone(),
        }
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NotionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
