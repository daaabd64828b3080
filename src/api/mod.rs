// src/api/mod.rs
//! Notion API interaction: the ability to read content from a workspace.
//!
//! Business logic depends on [`NotionRepository`], never on HTTP details.
//! The tree fetcher and the page cache gate are built on top of it.

pub mod client;
pub mod page_cache;
pub mod parser;
pub mod query;
mod simple_pagination;
pub mod tree_fetcher;
pub mod types;

use crate::error::AppError;
use crate::types::NotionId;
use serde::Serialize;
use serde_json::Value;
use types::{PaginatedResponse, RawBlock, RawPage};

/// What `search` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchObject {
    Page,
    /// Databases are searched through their data sources.
    DataSource,
}

/// Body of `POST /v1/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn only(mut self, object: SearchObject) -> Self {
        let value = match object {
            SearchObject::Page => "page",
            SearchObject::DataSource => "data_source",
        };
        self.filter = Some(serde_json::json!({ "property": "object", "value": value }));
        self
    }

    pub fn after(mut self, cursor: Option<String>) -> Self {
        self.start_cursor = cursor;
        self
    }
}

/// Body of `POST /v1/data_sources/{id}/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataSourceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

/// The ability to retrieve content from a Notion workspace.
///
/// Every call is one network round trip; nothing here retries.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Page metadata: id, url, last edit time, raw properties.
    async fn retrieve_page(&self, id: &NotionId) -> Result<RawPage, AppError>;

    /// One page of a block's children.
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<PaginatedResponse<RawBlock>, AppError>;

    async fn retrieve_data_source(&self, id: &NotionId) -> Result<Value, AppError>;

    /// One page of records matching `query`.
    async fn query_data_source(
        &self,
        id: &NotionId,
        query: &DataSourceQuery,
    ) -> Result<PaginatedResponse<Value>, AppError>;

    async fn search(&self, request: &SearchRequest) -> Result<PaginatedResponse<Value>, AppError>;
}

pub use client::NotionHttpClient;
pub use page_cache::{cache_key, DiskPageCache, MemoryPageCache, PageCache, PageLoader};
pub use query::{parse_filter, parse_sorts};
pub use tree_fetcher::TreeFetcher;
