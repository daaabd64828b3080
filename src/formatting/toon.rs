// src/formatting/toon.rs
//! TOON (Token-Oriented Object Notation) encoder for JSON values.
//!
//! Objects become indented `key: value` lines. Arrays carry their length
//! in the header and take the most compact applicable form:
//!
//! - all primitives: `tags[2]: a,b`
//! - objects sharing one set of primitive fields: a table,
//!   `rows[2]{id,name}:` followed by one comma-separated row per item
//! - anything else: one `- ` list item per element

use crate::constants::INDENT_SPACES;
use regex::Regex;
use serde_json::{Map, Number, Value};

lazy_static::lazy_static! {
    static ref NUMERIC_LIKE: Regex = Regex::new(r"(?i)^-?\d+(?:\.\d+)?(?:e[+-]?\d+)?$|^0\d+$")
        .expect("Failed to compile numeric literal regex - this is a bug in the code");

    static ref BARE_KEY: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$")
        .expect("Failed to compile bare key regex - this is a bug in the code");
}

/// Encodes `value` as a TOON document.
pub fn encode(value: &Value) -> String {
    let mut out = Lines::default();
    match value {
        Value::Object(map) => encode_fields(map, 0, &mut out),
        Value::Array(items) => encode_array("", items, 0, &mut out),
        primitive => out.push(0, encode_primitive(primitive)),
    }
    out.0.join("\n")
}

#[derive(Default)]
struct Lines(Vec<String>);

impl Lines {
    fn push(&mut self, depth: usize, content: impl AsRef<str>) {
        self.0
            .push(format!("{}{}", indent(depth), content.as_ref()));
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * INDENT_SPACES)
}

fn encode_fields(map: &Map<String, Value>, depth: usize, out: &mut Lines) {
    for (key, value) in map {
        encode_field(&encode_key(key), value, depth, out);
    }
}

fn encode_field(key: &str, value: &Value, depth: usize, out: &mut Lines) {
    match value {
        Value::Object(map) => {
            out.push(depth, format!("{}:", key));
            encode_fields(map, depth + 1, out);
        }
        Value::Array(items) => encode_array(key, items, depth, out),
        primitive => out.push(depth, format!("{}: {}", key, encode_primitive(primitive))),
    }
}

fn encode_array(key: &str, items: &[Value], depth: usize, out: &mut Lines) {
    let len = items.len();

    if items.iter().all(is_primitive) {
        if len == 0 {
            out.push(depth, format!("{}[0]:", key));
        } else {
            out.push(depth, format!("{}[{}]: {}", key, len, join_primitives(items.iter())));
        }
        return;
    }

    if let Some(fields) = tabular_fields(items) {
        let header: Vec<String> = fields.iter().map(|f| encode_key(f)).collect();
        out.push(depth, format!("{}[{}]{{{}}}:", key, len, header.join(",")));
        for item in items.iter().filter_map(Value::as_object) {
            let row = join_primitives(fields.iter().filter_map(|f| item.get(*f)));
            out.push(depth + 1, row);
        }
        return;
    }

    out.push(depth, format!("{}[{}]:", key, len));
    for item in items {
        encode_list_item(item, depth + 1, out);
    }
}

/// The shared field order when every item is an object with exactly the
/// same keys and only primitive values.
fn tabular_fields(items: &[Value]) -> Option<Vec<&String>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&String> = first.keys().collect();
    for item in items {
        let object = item.as_object()?;
        if object.len() != fields.len() {
            return None;
        }
        if !fields
            .iter()
            .all(|f| object.get(*f).is_some_and(is_primitive))
        {
            return None;
        }
    }
    Some(fields)
}

/// Encodes the item one level deeper, then turns the indentation of its
/// first line into the `- ` marker. Both are the same width, so the
/// item's remaining lines already line up under the marker's content.
fn encode_list_item(item: &Value, depth: usize, out: &mut Lines) {
    let start = out.0.len();
    match item {
        Value::Object(map) if !map.is_empty() => encode_fields(map, depth + 1, out),
        Value::Object(_) => out.push(depth + 1, ""),
        Value::Array(items) => encode_array("", items, depth + 1, out),
        primitive => out.push(depth + 1, encode_primitive(primitive)),
    }

    if let Some(first) = out.0.get_mut(start) {
        let content = first[indent(depth + 1).len()..].to_string();
        *first = format!("{}- {}", indent(depth), content)
            .trim_end()
            .to_string();
    }
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn join_primitives<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values.map(encode_primitive).collect::<Vec<_>>().join(",")
}

fn encode_primitive(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => encode_number(n),
        Value::String(s) => encode_string(s),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Whole floats are written without a fractional part.
fn encode_number(number: &Number) -> String {
    match number.as_f64() {
        Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => number.to_string(),
    }
}

fn encode_string(s: &str) -> String {
    if needs_quotes(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

fn encode_key(key: &str) -> String {
    if BARE_KEY.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Strings that would read back as something else, or that contain
/// structural characters, are quoted.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || matches!(s, "true" | "false" | "null")
        || NUMERIC_LIKE.is_match(s)
        || s.starts_with('-')
        || s.chars().any(|c| {
            matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}' | ',') || c.is_control()
        })
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
