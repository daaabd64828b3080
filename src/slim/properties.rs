// src/slim/properties.rs
//! Property reduction: a record's typed property map to plain values.

use super::{decode_or_default, lenient, rich_text_to_plain};
use crate::model::{PropertyMap, PropertyValue};
use serde::Deserialize;
use serde_json::Value;

/// Property type discriminators this crate understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Select,
    Status,
    MultiSelect,
    Date,
    Checkbox,
    Number,
    Url,
    Email,
    PhoneNumber,
    Files,
    CreatedTime,
    LastEditedTime,
    Relation,
    People,
    Formula,
    Rollup,
    Unsupported(String),
}

impl PropertyKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "title" => Self::Title,
            "rich_text" => Self::RichText,
            "select" => Self::Select,
            "status" => Self::Status,
            "multi_select" => Self::MultiSelect,
            "date" => Self::Date,
            "checkbox" => Self::Checkbox,
            "number" => Self::Number,
            "url" => Self::Url,
            "email" => Self::Email,
            "phone_number" => Self::PhoneNumber,
            "files" => Self::Files,
            "created_time" => Self::CreatedTime,
            "last_edited_time" => Self::LastEditedTime,
            "relation" => Self::Relation,
            "people" => Self::People,
            "formula" => Self::Formula,
            "rollup" => Self::Rollup,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The kind named by an object's `type` field.
    fn of(value: &Value) -> Self {
        Self::from_name(value.get("type").and_then(Value::as_str).unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
struct NamedOption {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DateRange {
    #[serde(default, deserialize_with = "lenient")]
    start: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileEntry {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    external: Option<UrlHolder>,
    #[serde(default, deserialize_with = "lenient")]
    file: Option<UrlHolder>,
}

#[derive(Debug, Default, Deserialize)]
struct UrlHolder {
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Reference {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

/// Extracts every non-title property as a plain value, keeping API order.
///
/// Anything that is not a JSON object yields an empty map.
pub fn extract_properties(properties: &Value) -> PropertyMap {
    let Some(map) = properties.as_object() else {
        return PropertyMap::new();
    };

    map.iter()
        .filter_map(|(name, property)| match PropertyKind::of(property) {
            PropertyKind::Title => None,
            kind => Some((name.clone(), reduce_property(&kind, property))),
        })
        .collect()
}

/// Reduces one `{type, <type>: payload}` object by its kind.
fn reduce_property(kind: &PropertyKind, property: &Value) -> PropertyValue {
    let payload = match kind {
        PropertyKind::Unsupported(_) => None,
        _ => property
            .get("type")
            .and_then(Value::as_str)
            .and_then(|name| property.get(name)),
    };

    match kind {
        PropertyKind::Title | PropertyKind::RichText => {
            let text = rich_text_to_plain(payload);
            if text.is_empty() {
                PropertyValue::Null
            } else {
                PropertyValue::Text(text)
            }
        }
        PropertyKind::Select | PropertyKind::Status => {
            let option: NamedOption = decode_or_default(payload);
            option.name.map_or(PropertyValue::Null, PropertyValue::Text)
        }
        PropertyKind::MultiSelect => {
            let options: Vec<Value> = decode_or_default(payload);
            PropertyValue::List(
                options
                    .iter()
                    .filter_map(|o| decode_or_default::<NamedOption>(Some(o)).name)
                    .map(PropertyValue::Text)
                    .collect(),
            )
        }
        PropertyKind::Date => date_value(payload),
        PropertyKind::Checkbox => payload
            .and_then(Value::as_bool)
            .map_or(PropertyValue::Null, PropertyValue::Bool),
        PropertyKind::Number => number_value(payload),
        PropertyKind::Url
        | PropertyKind::Email
        | PropertyKind::PhoneNumber
        | PropertyKind::CreatedTime
        | PropertyKind::LastEditedTime => string_value(payload),
        PropertyKind::Files => {
            let files: Vec<Value> = decode_or_default(payload);
            PropertyValue::List(
                files
                    .iter()
                    .filter_map(|f| {
                        let entry: FileEntry = decode_or_default(Some(f));
                        entry
                            .name
                            .filter(|n| !n.is_empty())
                            .or_else(|| entry.external.and_then(|e| e.url))
                            .or_else(|| entry.file.and_then(|e| e.url))
                    })
                    .map(PropertyValue::Text)
                    .collect(),
            )
        }
        PropertyKind::Relation => references(payload, |r| r.id),
        PropertyKind::People => {
            references(payload, |r| r.name.filter(|n| !n.is_empty()).or(r.id))
        }
        PropertyKind::Formula => formula_value(payload),
        PropertyKind::Rollup => rollup_value(payload),
        PropertyKind::Unsupported(_) => PropertyValue::Null,
    }
}

fn string_value(payload: Option<&Value>) -> PropertyValue {
    payload
        .and_then(Value::as_str)
        .map_or(PropertyValue::Null, PropertyValue::from)
}

fn number_value(payload: Option<&Value>) -> PropertyValue {
    match payload {
        Some(Value::Number(n)) => PropertyValue::Number(n.clone()),
        _ => PropertyValue::Null,
    }
}

/// `start`, or `start ~ end` when the range has both ends.
fn date_value(payload: Option<&Value>) -> PropertyValue {
    let range: DateRange = decode_or_default(payload);
    match (range.start, range.end) {
        (Some(start), Some(end)) => PropertyValue::Text(format!("{} ~ {}", start, end)),
        (Some(start), None) => PropertyValue::Text(start),
        (None, _) => PropertyValue::Null,
    }
}

fn references(
    payload: Option<&Value>,
    pick: impl Fn(Reference) -> Option<String>,
) -> PropertyValue {
    let entries: Vec<Value> = decode_or_default(payload);
    PropertyValue::List(
        entries
            .iter()
            .filter_map(|e| pick(decode_or_default(Some(e))))
            .map(PropertyValue::Text)
            .collect(),
    )
}

/// A formula's computed scalar, chosen by the formula's own `type`.
fn formula_value(payload: Option<&Value>) -> PropertyValue {
    let Some(formula) = payload else {
        return PropertyValue::Null;
    };
    let inner = |name: &str| formula.get(name);
    match formula.get("type").and_then(Value::as_str) {
        Some("string") => string_value(inner("string")),
        Some("number") => number_value(inner("number")),
        Some("boolean") => inner("boolean")
            .and_then(Value::as_bool)
            .map_or(PropertyValue::Null, PropertyValue::Bool),
        _ => PropertyValue::Null,
    }
}

/// A rollup's aggregate: a number, a date start, or the reduced items of
/// an array rollup (each item is itself a typed property value).
fn rollup_value(payload: Option<&Value>) -> PropertyValue {
    let Some(rollup) = payload else {
        return PropertyValue::Null;
    };
    match rollup.get("type").and_then(Value::as_str) {
        Some("number") => number_value(rollup.get("number")),
        Some("date") => {
            let range: DateRange = decode_or_default(rollup.get("date"));
            range.start.map_or(PropertyValue::Null, PropertyValue::Text)
        }
        Some("array") => match rollup.get("array") {
            Some(Value::Array(items)) => PropertyValue::List(
                items
                    .iter()
                    .map(|item| reduce_property(&PropertyKind::of(item), item))
                    .collect(),
            ),
            _ => PropertyValue::List(Vec::new()),
        },
        _ => PropertyValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn single(property: Value) -> PropertyValue {
        let map = extract_properties(&json!({ "P": property }));
        map.get("P").cloned().unwrap()
    }

    #[test]
    fn test_title_is_excluded() {
        let map = extract_properties(&json!({
            "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Task"}]},
            "Done": {"id": "x", "type": "checkbox", "checkbox": true}
        }));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Done"), Some(&PropertyValue::Bool(true)));
    }

    #[test]
    fn test_rich_text_empty_is_null() {
        assert_eq!(single(json!({"type": "rich_text", "rich_text": []})), PropertyValue::Null);
        assert_eq!(
            single(json!({"type": "rich_text", "rich_text": [{"plain_text": "a"}, {"plain_text": "b"}]})),
            PropertyValue::text("ab")
        );
    }

    #[test]
    fn test_select_and_status() {
        assert_eq!(
            single(json!({"type": "select", "select": {"id": "1", "name": "High", "color": "red"}})),
            PropertyValue::text("High")
        );
        assert_eq!(single(json!({"type": "select", "select": null})), PropertyValue::Null);
        assert_eq!(
            single(json!({"type": "status", "status": {"name": "Done"}})),
            PropertyValue::text("Done")
        );
    }

    #[test]
    fn test_multi_select_empty_is_list_not_null() {
        assert_eq!(
            single(json!({"type": "multi_select", "multi_select": [{"name": "Bug"}, {"name": "High"}]})),
            PropertyValue::from(vec!["Bug", "High"])
        );
        assert_eq!(
            single(json!({"type": "multi_select", "multi_select": []})),
            PropertyValue::List(vec![])
        );
    }

    #[test]
    fn test_date_forms() {
        assert_eq!(
            single(json!({"type": "date", "date": {"start": "2024-01-01", "end": null}})),
            PropertyValue::text("2024-01-01")
        );
        assert_eq!(
            single(json!({"type": "date", "date": {"start": "2024-01-01", "end": "2024-01-05"}})),
            PropertyValue::text("2024-01-01 ~ 2024-01-05")
        );
        assert_eq!(single(json!({"type": "date", "date": null})), PropertyValue::Null);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(single(json!({"type": "number", "number": 1500})), PropertyValue::from(1500i64));
        assert_eq!(single(json!({"type": "number", "number": null})), PropertyValue::Null);
        assert_eq!(single(json!({"type": "checkbox", "checkbox": false})), PropertyValue::from(false));
        assert_eq!(
            single(json!({"type": "url", "url": "https://example.com"})),
            PropertyValue::text("https://example.com")
        );
        assert_eq!(single(json!({"type": "email", "email": null})), PropertyValue::Null);
        assert_eq!(
            single(json!({"type": "last_edited_time", "last_edited_time": "2024-03-01T10:00:00.000Z"})),
            PropertyValue::text("2024-03-01T10:00:00.000Z")
        );
    }

    #[test]
    fn test_files_prefer_name_then_urls() {
        let value = single(json!({"type": "files", "files": [
            {"name": "spec.pdf", "type": "file", "file": {"url": "https://s3/spec.pdf"}},
            {"name": "", "type": "external", "external": {"url": "https://ext/a.png"}},
            {"type": "file", "file": {"url": "https://s3/b.png"}},
            {"type": "file"}
        ]}));
        assert_eq!(
            value,
            PropertyValue::from(vec!["spec.pdf", "https://ext/a.png", "https://s3/b.png"])
        );
    }

    #[test]
    fn test_relation_and_people() {
        assert_eq!(
            single(json!({"type": "relation", "relation": [{"id": "r1"}, {"id": "r2"}], "has_more": false})),
            PropertyValue::from(vec!["r1", "r2"])
        );
        assert_eq!(
            single(json!({"type": "people", "people": [
                {"object": "user", "id": "u1", "name": "Ada"},
                {"object": "user", "id": "u2"},
                {"object": "user"}
            ]})),
            PropertyValue::from(vec!["Ada", "u2"])
        );
    }

    #[test]
    fn test_formula_by_inner_type() {
        assert_eq!(
            single(json!({"type": "formula", "formula": {"type": "string", "string": "ok"}})),
            PropertyValue::text("ok")
        );
        assert_eq!(
            single(json!({"type": "formula", "formula": {"type": "number", "number": 3}})),
            PropertyValue::from(3i64)
        );
        assert_eq!(
            single(json!({"type": "formula", "formula": {"type": "boolean", "boolean": true}})),
            PropertyValue::from(true)
        );
        assert_eq!(
            single(json!({"type": "formula", "formula": {"type": "date", "date": {"start": "2024-01-01"}}})),
            PropertyValue::Null
        );
    }

    #[test]
    fn test_rollup_recurses_into_arrays() {
        assert_eq!(
            single(json!({"type": "rollup", "rollup": {"type": "number", "number": 42, "function": "sum"}})),
            PropertyValue::from(42i64)
        );
        assert_eq!(
            single(json!({"type": "rollup", "rollup": {"type": "date", "date": {"start": "2024-02-02"}}})),
            PropertyValue::text("2024-02-02")
        );
        assert_eq!(
            single(json!({"type": "rollup", "rollup": {"type": "array", "array": [
                {"type": "title", "title": [{"plain_text": "Linked"}]},
                {"type": "select", "select": {"name": "A"}},
                {"type": "number", "number": null}
            ]}})),
            PropertyValue::List(vec![
                PropertyValue::text("Linked"),
                PropertyValue::text("A"),
                PropertyValue::Null,
            ])
        );
        assert_eq!(
            single(json!({"type": "rollup", "rollup": {"type": "incomplete"}})),
            PropertyValue::Null
        );
    }

    #[test]
    fn test_unsupported_and_malformed_degrade() {
        assert_eq!(
            single(json!({"type": "unique_id", "unique_id": {"prefix": "T", "number": 1}})),
            PropertyValue::Null
        );
        assert_eq!(
            single(json!({"type": "multi_select", "multi_select": "oops"})),
            PropertyValue::List(vec![])
        );
        assert_eq!(single(json!("not an object")), PropertyValue::Null);
        assert!(extract_properties(&json!([1, 2])).is_empty());
    }
}
