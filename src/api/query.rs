// src/api/query.rs
//! Parsing of user-supplied filter and sorts arguments.
//!
//! Both are passed to Notion untouched; only the JSON itself and the
//! top-level shape of `sorts` are checked here.

use crate::error::{QueryField, QueryParseError};
use serde_json::Value;

/// Parses a filter expression. Any JSON value is accepted.
pub fn parse_filter(text: &str) -> Result<Value, QueryParseError> {
    serde_json::from_str(text).map_err(|e| QueryParseError::syntax(QueryField::Filter, e))
}

/// Parses a sorts expression, which must be a JSON array.
pub fn parse_sorts(text: &str) -> Result<Vec<Value>, QueryParseError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| QueryParseError::syntax(QueryField::Sorts, e))?;
    match value {
        Value::Array(sorts) => Ok(sorts),
        _ => Err(QueryParseError::shape(
            QueryField::Sorts,
            "sorts must be an array",
        )),
    }
}
