// src/formatting/mod.rs
//! Renders a loaded page into one of the output formats.
//!
//! All three renderers consume the same [`PageContent`]; none of them
//! talks to the network or looks anything up.

mod compact;
mod frontmatter;
mod json;
mod markdown;
pub mod toon;

pub use compact::CompactFormatter;
pub use frontmatter::render_frontmatter;
pub use json::JsonFormatter;
pub use markdown::{render_blocks, rich_text_to_markdown, MarkdownFormatter};

use crate::error::AppError;
use crate::model::PageContent;

/// Turns a page and its block tree into a single output string.
pub trait PageFormatter: Send + Sync {
    fn format_page(&self, content: &PageContent) -> Result<String, AppError>;
}

/// The page output formats the CLI and MCP server offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Token-efficient TOON encoding
    #[default]
    Toon,
    /// Pretty-printed JSON
    Json,
    /// Markdown with YAML-like frontmatter
    Markdown,
}

impl OutputFormat {
    /// Parses the lowercase format name used by MCP tool arguments.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "toon" => Some(Self::Toon),
            "json" => Some(Self::Json),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// The renderer for `format`. `include_links` only affects the compact
/// encoding; the others always keep links.
pub fn formatter_for(format: OutputFormat, include_links: bool) -> Box<dyn PageFormatter> {
    match format {
        OutputFormat::Toon => Box::new(CompactFormatter::new(include_links)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}
