// src/lib.rs
//! noon library: a lightweight Notion reader for the command line and for
//! MCP clients.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `ConfigStore`, `StoredToken`
//! - **Domain types**: `NotionId`, `parse_id`
//! - **Slim model**: `SlimBlock`, `PageContent`, `PropertyValue`, etc.
//! - **API client**: `NotionRepository`, `NotionHttpClient`, `TreeFetcher`
//! - **Formatting**: `PageFormatter`, `render_blocks`, `toon::encode`
//! - **Operations**: `Workspace`, `McpServer`

pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatting;
pub mod mcp;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod slim;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode, QueryParseError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, ConfigFile, ConfigStore, StoredToken};

// --- Domain Types ---
pub use crate::types::{parse_id, NotionId};

// --- Slim Model ---
pub use crate::model::{
    BlockContent, BlockType, CachedPage, DataSourceSchema, LoadedPage, PageContent, PropertyMap,
    PropertyValue, QueryRecord, ResultsEnvelope, RichTextSpan, SearchHit, SlimBlock, SlimPage,
};

// --- API Client ---
pub use crate::api::{
    DiskPageCache, MemoryPageCache, NotionHttpClient, NotionRepository, PageCache, PageLoader,
    TreeFetcher,
};
pub use crate::auth::{StaticToken, StoredTokenProvider, TokenProvider};
pub use crate::session::NotionSession;

// --- Formatting ---
pub use crate::formatting::{formatter_for, render_blocks, OutputFormat, PageFormatter};

// --- Operations ---
pub use crate::mcp::McpServer;
pub use crate::pipeline::Workspace;
