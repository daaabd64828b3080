// src/slim/mod.rs
//! Reducers from verbose Notion API objects to the slim model.
//!
//! Every function here is total: an unexpected shape degrades to an
//! empty or null value, never to an error. Notion's schema keeps growing,
//! and a new field or block type must not break reading a page.

mod block;
mod page;
mod properties;
mod rich_text;

pub use block::slim_block;
pub use page::{
    extract_title, slim_data_source_schema, slim_page, slim_query_results, slim_search_results,
};
pub use properties::{extract_properties, PropertyKind};
pub use rich_text::{rich_text_to_plain, slim_rich_text};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes `value` into `T`, falling back to `T::default()` on any
/// mismatch (absent, wrong type, missing fields).
pub(crate) fn decode_or_default<T>(value: Option<&Value>) -> T
where
    T: DeserializeOwned + Default,
{
    value
        .and_then(|v| T::deserialize(v).ok())
        .unwrap_or_default()
}

/// Field deserializer that turns a mistyped value into `None` instead
/// of failing the surrounding struct.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
