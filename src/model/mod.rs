// src/model/mod.rs
//! The slimmed domain model shared by the fetcher, the cache, and the
//! renderers.

mod block;
mod page;
mod property_value;
mod rich_text;

pub use block::{
    BlockContent, BlockType, ChildKind, LinkKind, MediaKind, SlimBlock, StructuralKind, TextKind,
};
pub use page::{
    CachedPage, DataSourceSchema, LoadedPage, PageContent, QueryRecord, ResultsEnvelope,
    SchemaOption, SchemaProperty, SearchHit, SlimPage,
};
pub use property_value::{PropertyMap, PropertyValue};
pub use rich_text::{plain_text, RichTextSpan, SpanAnnotations};
