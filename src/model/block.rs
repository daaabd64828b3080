// src/model/block.rs
//! The slimmed block tree.
//!
//! A [`SlimBlock`] keeps only what its block type needs. Types are a closed
//! set with one catch-all arm ([`BlockContent::Other`]) so new Notion block
//! types pass through by name instead of failing.
//!
//! On the wire (cache files, JSON output) a block is the flat object
//! `{type, richText?, checked?, language?, url?, title?, id?, children?}`.

use super::rich_text::RichTextSpan;
use serde::{Deserialize, Serialize};

/// Block types whose payload is a single rich-text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Toggle,
    Quote,
    Callout,
}

impl TextKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::BulletedListItem => "bulleted_list_item",
            Self::NumberedListItem => "numbered_list_item",
            Self::Toggle => "toggle",
            Self::Quote => "quote",
            Self::Callout => "callout",
        }
    }
}

/// Uploaded or linked media; the URL prefers the Notion-hosted copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    File,
    Pdf,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::File => "file",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Bookmark,
    Embed,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bookmark => "bookmark",
            Self::Embed => "embed",
        }
    }
}

/// Page and database boundaries. Their content is never fetched inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Page,
    Database,
}

impl ChildKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "child_page",
            Self::Database => "child_database",
        }
    }
}

/// Blocks whose value is their children, not their own fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    Divider,
    TableOfContents,
    ColumnList,
    Column,
    SyncedBlock,
    Template,
}

impl StructuralKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Divider => "divider",
            Self::TableOfContents => "table_of_contents",
            Self::ColumnList => "column_list",
            Self::Column => "column",
            Self::SyncedBlock => "synced_block",
            Self::Template => "template",
        }
    }
}

/// Classification of a Notion `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Text(TextKind),
    ToDo,
    Code,
    Media(MediaKind),
    Link(LinkKind),
    Child(ChildKind),
    Structural(StructuralKind),
    Other,
}

impl BlockType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "paragraph" => Self::Text(TextKind::Paragraph),
            "heading_1" => Self::Text(TextKind::Heading1),
            "heading_2" => Self::Text(TextKind::Heading2),
            "heading_3" => Self::Text(TextKind::Heading3),
            "bulleted_list_item" => Self::Text(TextKind::BulletedListItem),
            "numbered_list_item" => Self::Text(TextKind::NumberedListItem),
            "toggle" => Self::Text(TextKind::Toggle),
            "quote" => Self::Text(TextKind::Quote),
            "callout" => Self::Text(TextKind::Callout),
            "to_do" => Self::ToDo,
            "code" => Self::Code,
            "image" => Self::Media(MediaKind::Image),
            "video" => Self::Media(MediaKind::Video),
            "file" => Self::Media(MediaKind::File),
            "pdf" => Self::Media(MediaKind::Pdf),
            "bookmark" => Self::Link(LinkKind::Bookmark),
            "embed" => Self::Link(LinkKind::Embed),
            "child_page" => Self::Child(ChildKind::Page),
            "child_database" => Self::Child(ChildKind::Database),
            "divider" => Self::Structural(StructuralKind::Divider),
            "table_of_contents" => Self::Structural(StructuralKind::TableOfContents),
            "column_list" => Self::Structural(StructuralKind::ColumnList),
            "column" => Self::Structural(StructuralKind::Column),
            "synced_block" => Self::Structural(StructuralKind::SyncedBlock),
            "template" => Self::Structural(StructuralKind::Template),
            _ => Self::Other,
        }
    }

    /// Page and database references are leaves of the fetched tree.
    pub fn is_boundary(self) -> bool {
        matches!(self, Self::Child(_))
    }
}

/// The fields meaningful to one block type, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    Text {
        kind: TextKind,
        rich_text: Vec<RichTextSpan>,
    },
    ToDo {
        rich_text: Vec<RichTextSpan>,
        checked: bool,
    },
    Code {
        rich_text: Vec<RichTextSpan>,
        language: Option<String>,
    },
    Media {
        kind: MediaKind,
        url: String,
    },
    Link {
        kind: LinkKind,
        url: String,
    },
    ChildReference {
        kind: ChildKind,
        title: String,
        id: Option<String>,
    },
    Structural(StructuralKind),
    /// A type this crate does not know; only its name survives.
    Other(String),
}

impl BlockContent {
    /// The Notion type name of this block.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Text { kind, .. } => kind.as_str(),
            Self::ToDo { .. } => "to_do",
            Self::Code { .. } => "code",
            Self::Media { kind, .. } => kind.as_str(),
            Self::Link { kind, .. } => kind.as_str(),
            Self::ChildReference { kind, .. } => kind.as_str(),
            Self::Structural(kind) => kind.as_str(),
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn rich_text(&self) -> Option<&[RichTextSpan]> {
        match self {
            Self::Text { rich_text, .. }
            | Self::ToDo { rich_text, .. }
            | Self::Code { rich_text, .. } => Some(rich_text.as_slice()),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Media { url, .. } | Self::Link { url, .. } => Some(url.as_str()),
            _ => None,
        }
    }
}

/// One node of a page's slimmed content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SlimBlockWire", into = "SlimBlockWire")]
pub struct SlimBlock {
    pub content: BlockContent,
    pub children: Vec<SlimBlock>,
}

impl SlimBlock {
    pub fn new(content: BlockContent) -> Self {
        Self {
            content,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SlimBlock>) -> Self {
        self.children = children;
        self
    }

    pub fn text(kind: TextKind, rich_text: Vec<RichTextSpan>) -> Self {
        Self::new(BlockContent::Text { kind, rich_text })
    }

    pub fn paragraph(text: &str) -> Self {
        Self::text(TextKind::Paragraph, vec![RichTextSpan::plain(text)])
    }

    pub fn type_name(&self) -> &str {
        self.content.type_name()
    }

    /// Bulleted, numbered, to-do, and toggle blocks form list runs.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self.content,
            BlockContent::Text {
                kind: TextKind::BulletedListItem | TextKind::NumberedListItem | TextKind::Toggle,
                ..
            } | BlockContent::ToDo { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlimBlockWire {
    #[serde(rename = "type", default)]
    block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rich_text: Option<Vec<RichTextSpan>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<SlimBlock>,
}

impl From<SlimBlockWire> for SlimBlock {
    fn from(wire: SlimBlockWire) -> Self {
        let rich_text = wire.rich_text.unwrap_or_default();
        let content = match BlockType::from_name(&wire.block_type) {
            BlockType::Text(kind) => BlockContent::Text { kind, rich_text },
            BlockType::ToDo => BlockContent::ToDo {
                rich_text,
                checked: wire.checked.unwrap_or(false),
            },
            BlockType::Code => BlockContent::Code {
                rich_text,
                language: wire.language,
            },
            BlockType::Media(kind) => BlockContent::Media {
                kind,
                url: wire.url.unwrap_or_default(),
            },
            BlockType::Link(kind) => BlockContent::Link {
                kind,
                url: wire.url.unwrap_or_default(),
            },
            BlockType::Child(kind) => BlockContent::ChildReference {
                kind,
                title: wire.title.unwrap_or_default(),
                id: wire.id,
            },
            BlockType::Structural(kind) => BlockContent::Structural(kind),
            BlockType::Other => BlockContent::Other(wire.block_type),
        };
        Self {
            content,
            children: wire.children,
        }
    }
}

impl From<SlimBlock> for SlimBlockWire {
    fn from(block: SlimBlock) -> Self {
        let mut wire = SlimBlockWire {
            block_type: block.content.type_name().to_string(),
            children: block.children,
            ..Default::default()
        };
        match block.content {
            BlockContent::Text { rich_text, .. } => wire.rich_text = Some(rich_text),
            BlockContent::ToDo { rich_text, checked } => {
                wire.rich_text = Some(rich_text);
                wire.checked = Some(checked);
            }
            BlockContent::Code {
                rich_text,
                language,
            } => {
                wire.rich_text = Some(rich_text);
                wire.language = language;
            }
            BlockContent::Media { url, .. } | BlockContent::Link { url, .. } => {
                wire.url = Some(url)
            }
            BlockContent::ChildReference { title, id, .. } => {
                wire.title = Some(title);
                wire.id = id;
            }
            BlockContent::Structural(_) | BlockContent::Other(_) => {}
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_to_do_serializes_checked_even_when_false() {
        let block = SlimBlock::new(BlockContent::ToDo {
            rich_text: vec![RichTextSpan::plain("Task")],
            checked: false,
        });
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "to_do", "richText": [{"text": "Task"}], "checked": false})
        );
    }

    #[test]
    fn test_structural_block_has_only_type_and_children() {
        let block = SlimBlock::new(BlockContent::Structural(StructuralKind::Column))
            .with_children(vec![SlimBlock::paragraph("inside")]);
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "column", "children": [{"type": "paragraph", "richText": [{"text": "inside"}]}]})
        );
    }

    #[test]
    fn test_unknown_type_survives_by_name() {
        let block: SlimBlock =
            serde_json::from_value(json!({"type": "ai_block", "richText": [{"text": "x"}]}))
                .unwrap();
        assert_eq!(block.content, BlockContent::Other("ai_block".to_string()));
        assert_eq!(serde_json::to_value(&block).unwrap(), json!({"type": "ai_block"}));
    }

    #[test]
    fn test_list_item_classification() {
        let bullet = SlimBlock::text(TextKind::BulletedListItem, vec![]);
        let toggle = SlimBlock::text(TextKind::Toggle, vec![]);
        let todo = SlimBlock::new(BlockContent::ToDo {
            rich_text: vec![],
            checked: true,
        });
        assert!(bullet.is_list_item() && toggle.is_list_item() && todo.is_list_item());
        assert!(!SlimBlock::paragraph("p").is_list_item());
    }
}
