// src/slim/block.rs
//! Block reduction: one raw Notion block to one [`SlimBlock`].

use super::{decode_or_default, lenient, slim_rich_text};
use crate::api::types::RawBlock;
use crate::model::{BlockContent, BlockType, SlimBlock};
use serde::Deserialize;
use serde_json::Value;

/// The union of the per-type payload fields this crate reads.
#[derive(Debug, Default, Deserialize)]
struct BlockPayload {
    #[serde(default)]
    rich_text: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    checked: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    /// Notion-hosted upload.
    #[serde(default, deserialize_with = "lenient")]
    file: Option<FileLocation>,
    #[serde(default, deserialize_with = "lenient")]
    external: Option<FileLocation>,
}

#[derive(Debug, Default, Deserialize)]
struct FileLocation {
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Reduces one raw block to the fields meaningful for its type.
///
/// Children are left empty; descending into them is the tree fetcher's
/// job. Unknown types keep only their name.
pub fn slim_block(block: &RawBlock) -> SlimBlock {
    let payload: BlockPayload = decode_or_default(block.payload());

    let content = match BlockType::from_name(&block.block_type) {
        BlockType::Text(kind) => BlockContent::Text {
            kind,
            rich_text: slim_rich_text(payload.rich_text.as_ref()),
        },
        BlockType::ToDo => BlockContent::ToDo {
            rich_text: slim_rich_text(payload.rich_text.as_ref()),
            checked: payload.checked.unwrap_or(false),
        },
        BlockType::Code => BlockContent::Code {
            rich_text: slim_rich_text(payload.rich_text.as_ref()),
            language: non_empty(payload.language),
        },
        BlockType::Media(kind) => {
            let hosted = payload.file.and_then(|f| non_empty(f.url));
            let external = payload.external.and_then(|f| non_empty(f.url));
            BlockContent::Media {
                kind,
                url: hosted.or(external).unwrap_or_default(),
            }
        }
        BlockType::Link(kind) => BlockContent::Link {
            kind,
            url: payload.url.unwrap_or_default(),
        },
        BlockType::Child(kind) => BlockContent::ChildReference {
            kind,
            title: payload.title.unwrap_or_default(),
            id: Some(block.id.clone()).filter(|id| !id.is_empty()),
        },
        BlockType::Structural(kind) => BlockContent::Structural(kind),
        BlockType::Other => BlockContent::Other(block.block_type.clone()),
    };

    SlimBlock::new(content)
}
