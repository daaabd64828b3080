// src/model/property_value.rs
//! Plain values extracted from database record properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A property reduced to a JSON-compatible scalar or array.
///
/// Serialized untagged, so a map of these is exactly the JSON object a
/// reader would expect: `{"Tags": ["Bug"], "Done": true, "Due": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Property name to value, in the order Notion returned them.
pub type PropertyMap = IndexMap<String, PropertyValue>;
