// src/formatting/markdown.rs
//! Markdown rendering of the slim block tree.
//!
//! Top-level siblings are separated by a blank line, except that two
//! adjacent list-like blocks (bulleted, numbered, to-do, toggle) share a
//! single newline. Blocks that render to nothing, such as empty
//! paragraphs, are dropped and force a blank line between their
//! neighbours. Nested children follow their parent line directly, one per
//! line, with list items indented by depth.

use super::frontmatter::render_frontmatter;
use super::PageFormatter;
use crate::constants::INDENT_SPACES;
use crate::error::AppError;
use crate::model::{
    plain_text, BlockContent, ChildKind, LinkKind, MediaKind, PageContent, RichTextSpan,
    SlimBlock, StructuralKind, TextKind,
};

pub struct MarkdownFormatter;

impl PageFormatter for MarkdownFormatter {
    fn format_page(&self, content: &PageContent) -> Result<String, AppError> {
        let mut output = String::new();
        if !content.page.properties.is_empty() {
            output.push_str(&render_frontmatter(&content.page.properties));
            output.push_str("\n\n");
        }
        output.push_str("# ");
        output.push_str(&content.page.title);
        output.push_str("\n\n");
        output.push_str(&render_blocks(&content.blocks));
        Ok(output)
    }
}

/// Renders top-level blocks with the adjacency-aware separators.
pub fn render_blocks(blocks: &[SlimBlock]) -> String {
    let mut output = String::new();
    let mut previous: Option<&SlimBlock> = None;
    let mut gap = false;

    for block in blocks {
        let rendered = render_block(block, 0);
        if rendered.is_empty() {
            gap = true;
            continue;
        }
        if let Some(prev) = previous {
            let tight = !gap && prev.is_list_item() && block.is_list_item();
            output.push_str(if tight { "\n" } else { "\n\n" });
        }
        output.push_str(&rendered);
        previous = Some(block);
        gap = false;
    }

    output
}

fn render_block(block: &SlimBlock, depth: usize) -> String {
    let line = render_line(&block.content, depth);

    let children: Vec<String> = block
        .children
        .iter()
        .map(|child| render_block(child, depth + 1))
        .filter(|rendered| !rendered.is_empty())
        .collect();

    match (line.is_empty(), children.is_empty()) {
        (_, true) => line,
        (true, false) => children.join("\n"),
        (false, false) => format!("{}\n{}", line, children.join("\n")),
    }
}

/// The block's own line(s), without its children.
fn render_line(content: &BlockContent, depth: usize) -> String {
    let indent = " ".repeat(depth * INDENT_SPACES);

    match content {
        BlockContent::Text { kind, rich_text } => {
            let text = rich_text_to_markdown(rich_text);
            match kind {
                TextKind::Paragraph => text,
                TextKind::Heading1 => format!("# {}", text),
                TextKind::Heading2 => format!("## {}", text),
                TextKind::Heading3 => format!("### {}", text),
                TextKind::BulletedListItem | TextKind::Toggle => format!("{}- {}", indent, text),
                TextKind::NumberedListItem => format!("{}1. {}", indent, text),
                TextKind::Quote | TextKind::Callout => format!("> {}", text),
            }
        }
        BlockContent::ToDo { rich_text, checked } => format!(
            "{}- [{}] {}",
            indent,
            if *checked { "x" } else { " " },
            rich_text_to_markdown(rich_text)
        ),
        // Markdown is not interpreted inside a fence, so the code body
        // stays plain.
        BlockContent::Code {
            rich_text,
            language,
        } => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or(""),
            plain_text(rich_text)
        ),
        BlockContent::Media { kind, url } => match kind {
            MediaKind::Image => format!("![]({})", url),
            MediaKind::Video | MediaKind::File | MediaKind::Pdf => {
                format!("[{}]({})", kind.as_str(), url)
            }
        },
        BlockContent::Link {
            kind: LinkKind::Bookmark | LinkKind::Embed,
            url,
        } => url.clone(),
        BlockContent::ChildReference { kind, title, id } => {
            let marker = match kind {
                ChildKind::Page => "📄",
                ChildKind::Database => "📊",
            };
            match id {
                Some(id) => format!("{} {} ({})", marker, title, id),
                None => format!("{} {}", marker, title),
            }
        }
        BlockContent::Structural(StructuralKind::Divider) => "---".to_string(),
        BlockContent::Structural(_) | BlockContent::Other(_) => String::new(),
    }
}

/// Renders spans with their annotations.
///
/// Styles wrap from the inside out: code, bold, italic, strikethrough.
/// A link wraps the fully styled text.
pub fn rich_text_to_markdown(spans: &[RichTextSpan]) -> String {
    spans.iter().map(span_to_markdown).collect()
}

fn span_to_markdown(span: &RichTextSpan) -> String {
    let style = &span.annotations;
    let mut text = span.text.clone();

    if style.code {
        text = format!("`{}`", text);
    }
    if style.bold {
        text = format!("**{}**", text);
    }
    if style.italic {
        text = format!("*{}*", text);
    }
    if style.strikethrough {
        text = format!("~~{}~~", text);
    }

    if let Some(href) = &span.href {
        text = format!("[{}]({})", text, href);
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpanAnnotations;
    use pretty_assertions::assert_eq;

    fn styled(text: &str, annotations: SpanAnnotations) -> RichTextSpan {
        RichTextSpan::plain(text).with_annotations(annotations)
    }

    #[test]
    fn test_bold_italic_compose() {
        let span = styled(
            "formatted",
            SpanAnnotations {
                bold: true,
                italic: true,
                ..Default::default()
            },
        );
        assert_eq!(rich_text_to_markdown(&[span]), "***formatted***");
    }

    #[test]
    fn test_link_wraps_styled_text() {
        let span = styled(
            "docs",
            SpanAnnotations {
                bold: true,
                ..Default::default()
            },
        )
        .with_href("https://example.com");
        assert_eq!(
            rich_text_to_markdown(&[span]),
            "[**docs**](https://example.com)"
        );
    }

    #[test]
    fn test_code_is_innermost() {
        let span = styled(
            "x",
            SpanAnnotations {
                code: true,
                strikethrough: true,
                ..Default::default()
            },
        );
        assert_eq!(rich_text_to_markdown(&[span]), "~~`x`~~");
    }

    #[test]
    fn test_code_block_body_ignores_annotations() {
        let block = SlimBlock::new(BlockContent::Code {
            rich_text: vec![
                styled(
                    "let x = 1;",
                    SpanAnnotations {
                        bold: true,
                        ..Default::default()
                    },
                )
                .with_href("https://example.com"),
                RichTextSpan::plain("\n*not emphasis*"),
            ],
            language: Some("rust".to_string()),
        });
        assert_eq!(
            render_blocks(&[block]),
            "```rust\nlet x = 1;\n*not emphasis*\n```"
        );
    }

    #[test]
    fn test_spans_concatenate_without_separator() {
        let spans = vec![
            RichTextSpan::plain("Hello "),
            styled(
                "World",
                SpanAnnotations {
                    bold: true,
                    ..Default::default()
                },
            ),
        ];
        assert_eq!(rich_text_to_markdown(&spans), "Hello **World**");
    }

    #[test]
    fn test_empty_paragraphs_collapse_to_one_gap() {
        let blocks = vec![
            SlimBlock::paragraph("A"),
            SlimBlock::paragraph(""),
            SlimBlock::paragraph(""),
            SlimBlock::paragraph("B"),
        ];
        assert_eq!(render_blocks(&blocks), "A\n\nB");
    }

    #[test]
    fn test_structural_block_without_children_renders_nothing() {
        let blocks = vec![
            SlimBlock::paragraph("A"),
            SlimBlock::new(BlockContent::Structural(StructuralKind::TableOfContents)),
            SlimBlock::paragraph("B"),
        ];
        assert_eq!(render_blocks(&blocks), "A\n\nB");
    }

    #[test]
    fn test_column_list_renders_only_its_children() {
        let column = SlimBlock::new(BlockContent::Structural(StructuralKind::Column))
            .with_children(vec![SlimBlock::paragraph("left")]);
        let columns = SlimBlock::new(BlockContent::Structural(StructuralKind::ColumnList))
            .with_children(vec![column]);
        assert_eq!(render_blocks(&[columns]), "left");
    }
}
