// src/slim/rich_text.rs
//! Rich-text reduction: Notion text objects to [`RichTextSpan`]s.

use super::{decode_or_default, lenient};
use crate::model::{plain_text, RichTextSpan, SpanAnnotations};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct RawSpan {
    #[serde(default, deserialize_with = "lenient")]
    plain_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    href: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    annotations: Option<RawAnnotations>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnnotations {
    #[serde(default, deserialize_with = "lenient")]
    bold: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    italic: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    strikethrough: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    code: Option<bool>,
}

impl From<RawAnnotations> for SpanAnnotations {
    fn from(raw: RawAnnotations) -> Self {
        Self {
            bold: raw.bold.unwrap_or(false),
            italic: raw.italic.unwrap_or(false),
            strikethrough: raw.strikethrough.unwrap_or(false),
            code: raw.code.unwrap_or(false),
        }
    }
}

impl From<RawSpan> for RichTextSpan {
    fn from(raw: RawSpan) -> Self {
        Self {
            text: raw.plain_text.unwrap_or_default(),
            href: raw.href.filter(|href| !href.is_empty()),
            annotations: raw.annotations.map(Into::into).unwrap_or_default(),
        }
    }
}

/// Reduces a Notion rich-text array to slim spans.
///
/// Order and count are preserved; a malformed element becomes an empty
/// span rather than disappearing. Anything other than an array yields no
/// spans. Colors, mentions, and equations keep only their plain text.
pub fn slim_rich_text(value: Option<&Value>) -> Vec<RichTextSpan> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| RichTextSpan::from(decode_or_default::<RawSpan>(Some(item))))
            .collect(),
        _ => Vec::new(),
    }
}

/// The concatenated plain text of a Notion rich-text array.
pub fn rich_text_to_plain(value: Option<&Value>) -> String {
    plain_text(&slim_rich_text(value))
}
