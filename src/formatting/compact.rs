// src/formatting/compact.rs
//! Compact, token-efficient page output.
//!
//! Rich text is flattened to plain text and the tree is handed to the
//! TOON encoder. Link targets are dropped unless asked for, in which case
//! each block lists the `{text, href}` pairs of its linked spans.

use super::toon;
use super::PageFormatter;
use crate::error::AppError;
use crate::model::{plain_text, BlockContent, PageContent, SlimBlock};
use serde::Serialize;

pub struct CompactFormatter {
    include_links: bool,
}

impl CompactFormatter {
    pub fn new(include_links: bool) -> Self {
        Self { include_links }
    }

    fn compact_block<'a>(&self, block: &'a SlimBlock) -> CompactBlock<'a> {
        let content = &block.content;
        let rich_text = content.rich_text();

        let (checked, language, title, id) = match content {
            BlockContent::ToDo { checked, .. } => (Some(*checked), None, None, None),
            BlockContent::Code { language, .. } => (None, language.as_deref(), None, None),
            BlockContent::ChildReference { title, id, .. } => {
                (None, None, Some(title.as_str()), id.as_deref())
            }
            _ => (None, None, None, None),
        };

        let links = match rich_text {
            Some(spans) if self.include_links => {
                let links: Vec<CompactLink<'a>> = spans
                    .iter()
                    .filter_map(|span| {
                        span.href.as_deref().map(|href| CompactLink {
                            text: &span.text,
                            href,
                        })
                    })
                    .collect();
                Some(links).filter(|links| !links.is_empty())
            }
            _ => None,
        };

        CompactBlock {
            block_type: content.type_name(),
            text: rich_text.map(plain_text),
            checked,
            language: language.filter(|l| !l.is_empty()),
            url: content.url().filter(|u| !u.is_empty()),
            title: title.filter(|t| !t.is_empty()),
            id,
            links,
            children: block
                .children
                .iter()
                .map(|child| self.compact_block(child))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct CompactPage<'a> {
    id: &'a str,
    title: &'a str,
    blocks: Vec<CompactBlock<'a>>,
}

#[derive(Serialize)]
struct CompactBlock<'a> {
    #[serde(rename = "type")]
    block_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<Vec<CompactLink<'a>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<CompactBlock<'a>>,
}

#[derive(Serialize)]
struct CompactLink<'a> {
    text: &'a str,
    href: &'a str,
}

impl PageFormatter for CompactFormatter {
    fn format_page(&self, content: &PageContent) -> Result<String, AppError> {
        let page = CompactPage {
            id: &content.page.id,
            title: &content.page.title,
            blocks: content
                .blocks
                .iter()
                .map(|block| self.compact_block(block))
                .collect(),
        };
        Ok(toon::encode(&serde_json::to_value(&page)?))
    }
}
