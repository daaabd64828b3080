// src/api/types.rs
//! Raw response shapes from the Notion API.
//!
//! These stay close to the wire and keep the type-specific payloads as
//! untyped JSON. The reducers in [`crate::slim`] turn them into the slim
//! model and never fail on an unexpected shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// A single, final page holding `results`.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            object: "list".to_string(),
            results,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// One block as returned by "retrieve block children".
///
/// The type-specific payload lives under a key named after `type`
/// (`{"type": "paragraph", "paragraph": {...}}`) and is kept in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawBlock {
    /// The object stored under the block's own type name.
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get(&self.block_type)
    }
}

/// Page metadata from "retrieve a page".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    pub id: String,
    #[serde(default)]
    pub url: String,
    pub last_edited_time: String,
    #[serde(default)]
    pub properties: Value,
}
