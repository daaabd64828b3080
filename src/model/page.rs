// src/model/page.rs
//! Page-level shapes: the slim page, its cache entry, and the result
//! envelopes for search, query, and schema calls.

use super::block::SlimBlock;
use super::property_value::PropertyMap;
use serde::{Deserialize, Serialize};

/// Page metadata with the title promoted out of the property map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlimPage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Every property except the title, in API order.
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

/// What every renderer consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub page: SlimPage,
    pub blocks: Vec<SlimBlock>,
}

/// A page delivered by the cache gate, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub content: PageContent,
    pub from_cache: bool,
}

/// One persisted page tree, valid for exactly one `last_edited_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPage {
    pub page_id: String,
    pub last_edited_time: String,
    /// Milliseconds since the Unix epoch.
    pub fetched_at: i64,
    pub page: SlimPage,
    pub blocks: Vec<SlimBlock>,
}

/// Pagination envelope passed through from the API. `next_cursor` is
/// opaque and serialized as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsEnvelope<T> {
    pub results: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub object: String,
    pub id: String,
    pub title: String,
}

/// A database record reduced to its id, title, and plain properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

/// A data source's property definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceSchema {
    pub id: String,
    pub title: String,
    pub properties: Vec<SchemaProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    /// Present only for select, multi_select, and status with options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SchemaOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
