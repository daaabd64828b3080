// src/slim/page.rs
//! Titles and the slimmed search, query, and schema responses.

use super::{decode_or_default, extract_properties, lenient};
use crate::api::types::{PaginatedResponse, RawPage};
use crate::constants::UNTITLED;
use crate::model::{
    DataSourceSchema, QueryRecord, ResultsEnvelope, SchemaOption, SchemaProperty, SearchHit,
    SlimPage,
};
use serde::Deserialize;
use serde_json::Value;

/// Joins a rich-text array's `plain_text`, or `None` if any element
/// lacks one.
fn plain_text_array(value: Option<&Value>) -> Option<String> {
    value?
        .as_array()?
        .iter()
        .map(|item| item.get("plain_text").and_then(Value::as_str))
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.concat())
}

fn or_untitled(text: String) -> String {
    if text.is_empty() {
        UNTITLED.to_string()
    } else {
        text
    }
}

/// The display title of a page, database, or data source.
///
/// Pages carry it as the first `title`-typed property; databases and data
/// sources as a top-level `title` array. Missing or empty titles become
/// `(untitled)`.
pub fn extract_title(item: &Value) -> String {
    item.get("properties")
        .and_then(title_from_properties)
        .or_else(|| plain_text_array(item.get("title")))
        .map(or_untitled)
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Text of the first `title`-typed property in a property map.
fn title_from_properties(properties: &Value) -> Option<String> {
    properties
        .as_object()?
        .values()
        .filter(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        .find_map(|p| plain_text_array(p.get("title")))
}

/// Page metadata with the title promoted and the rest of the properties
/// reduced to plain values.
pub fn slim_page(page: &RawPage) -> SlimPage {
    SlimPage {
        id: page.id.clone(),
        title: title_from_properties(&page.properties)
            .map(or_untitled)
            .unwrap_or_else(|| UNTITLED.to_string()),
        url: page.url.clone(),
        properties: extract_properties(&page.properties),
    }
}

fn string_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn envelope<T>(response: &PaginatedResponse<Value>, slim: impl Fn(&Value) -> T) -> ResultsEnvelope<T> {
    ResultsEnvelope {
        results: response.results.iter().map(slim).collect(),
        has_more: response.has_more,
        next_cursor: response.next_cursor.clone(),
    }
}

/// Search hits reduced to `{object, id, title}`.
pub fn slim_search_results(response: &PaginatedResponse<Value>) -> ResultsEnvelope<SearchHit> {
    envelope(response, |item| SearchHit {
        object: string_field(item, "object"),
        id: string_field(item, "id"),
        title: extract_title(item),
    })
}

/// Database records reduced to id, title, url, and plain properties.
pub fn slim_query_results(response: &PaginatedResponse<Value>) -> ResultsEnvelope<QueryRecord> {
    envelope(response, |item| QueryRecord {
        id: string_field(item, "id"),
        title: extract_title(item),
        url: string_field(item, "url"),
        properties: item
            .get("properties")
            .map(extract_properties)
            .unwrap_or_default(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct OptionList {
    #[serde(default, deserialize_with = "lenient")]
    options: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOption {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    color: Option<String>,
}

/// Select-like option lists, or `None` when there are none to show.
fn schema_options(property: &Value, property_type: &str) -> Option<Vec<SchemaOption>> {
    if !matches!(property_type, "select" | "multi_select" | "status") {
        return None;
    }
    let list: OptionList = decode_or_default(property.get(property_type));
    let options: Vec<SchemaOption> = list
        .options
        .unwrap_or_default()
        .iter()
        .map(|o| decode_or_default::<RawOption>(Some(o)))
        .map(|o| SchemaOption {
            name: o.name.unwrap_or_default(),
            color: o.color.filter(|c| !c.is_empty()),
        })
        .collect();
    Some(options).filter(|o| !o.is_empty())
}

/// A data source's property definitions, in API order.
pub fn slim_data_source_schema(data_source: &Value) -> DataSourceSchema {
    let properties = data_source
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, property)| {
                    let property_type = string_field(property, "type");
                    SchemaProperty {
                        name: name.clone(),
                        options: schema_options(property, &property_type),
                        property_type,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    DataSourceSchema {
        id: string_field(data_source, "id"),
        title: extract_title(data_source),
        properties,
    }
}
