// src/formatting/frontmatter.rs
//! YAML-like frontmatter for page properties.
//!
//! Not a YAML emitter. Values are written the way a reader expects them:
//! scalars bare, risky strings double-quoted, multi-line strings as a
//! literal block, lists in flow style.

use crate::constants::INDENT_SPACES;
use crate::model::{PropertyMap, PropertyValue};

/// `---`-fenced `key: value` lines, one per property, in map order.
pub fn render_frontmatter(properties: &PropertyMap) -> String {
    let mut lines = vec!["---".to_string()];
    for (key, value) in properties {
        lines.push(render_entry(key, value));
    }
    lines.push("---".to_string());
    lines.join("\n")
}

fn render_entry(key: &str, value: &PropertyValue) -> String {
    let key = scalar(key, false);
    match value {
        PropertyValue::Text(text) if text.contains('\n') => {
            let indent = " ".repeat(INDENT_SPACES);
            let body: Vec<String> = text
                .lines()
                .map(|line| format!("{}{}", indent, line))
                .collect();
            format!("{}: |\n{}", key, body.join("\n"))
        }
        other => format!("{}: {}", key, inline(other, false)),
    }
}

/// A value on a single line. Inside a flow list, separators also force
/// quoting.
fn inline(value: &PropertyValue, in_list: bool) -> String {
    match value {
        PropertyValue::Null => "null".to_string(),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Number(n) => n.to_string(),
        PropertyValue::Text(text) => scalar(text, in_list),
        PropertyValue::List(items) => {
            let items: Vec<String> = items.iter().map(|item| inline(item, true)).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn scalar(text: &str, in_list: bool) -> String {
    if needs_quotes(text, in_list) {
        quote(text)
    } else {
        text.to_string()
    }
}

fn needs_quotes(text: &str, in_list: bool) -> bool {
    if text.is_empty() || text.trim() != text {
        return true;
    }
    if text.contains(|c: char| matches!(c, ':' | '#' | '"' | '\'' | '\n' | '\r' | '\t')) {
        return true;
    }
    in_list && text.contains(|c: char| matches!(c, ',' | '[' | ']' | '{' | '}'))
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
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
