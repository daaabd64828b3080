// src/model/rich_text.rs
//! Styled text spans in their slimmed form.

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Style flags carried by a span. Only `true` flags are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAnnotations {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl SpanAnnotations {
    /// True when no style flag is set.
    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.strikethrough || self.code)
    }
}

/// One run of text with an optional link and style flags.
///
/// An all-false annotations object is never serialized, so
/// `{"text": "x"}` and `{"text": "x", "annotations": {}}` decode to the
/// same span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSpan {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "SpanAnnotations::is_plain")]
    pub annotations: SpanAnnotations,
}

impl RichTextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_annotations(mut self, annotations: SpanAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Concatenates the text of every span, in order, with no separator.
pub fn plain_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}
