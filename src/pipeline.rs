// src/pipeline.rs
//! The read operations the CLI and the MCP server share.
//!
//! Each one normalizes the user's id or URL, makes the API calls, and
//! returns the slim result. Printing is left to the caller.

use crate::api::{
    parse_filter, parse_sorts, DataSourceQuery, NotionRepository, PageCache, PageLoader,
    SearchObject, SearchRequest,
};
use crate::error::AppError;
use crate::model::{DataSourceSchema, LoadedPage, QueryRecord, ResultsEnvelope, SearchHit};
use crate::slim::{slim_data_source_schema, slim_query_results, slim_search_results};
use crate::types::NotionId;
use std::sync::Arc;

/// Read access to one workspace through a repository and a page cache.
pub struct Workspace {
    repository: Arc<dyn NotionRepository>,
    cache: Arc<dyn PageCache>,
    loader: PageLoader,
}

impl Workspace {
    pub fn new(repository: Arc<dyn NotionRepository>, cache: Arc<dyn PageCache>) -> Self {
        let loader = PageLoader::new(Arc::clone(&repository), Arc::clone(&cache));
        Self {
            repository,
            cache,
            loader,
        }
    }

    pub async fn search(
        &self,
        query: &str,
        only: Option<SearchObject>,
        cursor: Option<String>,
    ) -> Result<ResultsEnvelope<SearchHit>, AppError> {
        let mut request = SearchRequest::new(query).after(cursor);
        if let Some(object) = only {
            request = request.only(object);
        }
        log::debug!("Searching for {:?}", query);
        let response = self.repository.search(&request).await?;
        Ok(slim_search_results(&response))
    }

    /// A page and its whole block tree. `refresh` bypasses the cached
    /// tree but still stores the fresh one.
    pub async fn page(&self, input: &str, refresh: bool) -> Result<LoadedPage, AppError> {
        let id = NotionId::parse(input)?;
        let loaded = if refresh {
            self.loader.refresh(&id).await?
        } else {
            self.loader.load(&id).await?
        };
        log::info!(
            "Loaded page {} ({} top-level blocks, from cache: {})",
            id,
            loaded.content.blocks.len(),
            loaded.from_cache
        );
        Ok(loaded)
    }

    pub async fn database(&self, input: &str) -> Result<DataSourceSchema, AppError> {
        let id = NotionId::parse(input)?;
        let data_source = self.repository.retrieve_data_source(&id).await?;
        Ok(slim_data_source_schema(&data_source))
    }

    /// Filter and sorts are parsed before any request is made.
    pub async fn query(
        &self,
        input: &str,
        filter: Option<&str>,
        sorts: Option<&str>,
        cursor: Option<String>,
    ) -> Result<ResultsEnvelope<QueryRecord>, AppError> {
        let query = DataSourceQuery {
            filter: filter.map(parse_filter).transpose()?,
            sorts: sorts.map(parse_sorts).transpose()?,
            start_cursor: cursor,
        };
        let id = NotionId::parse(input)?;
        let response = self.repository.query_data_source(&id, &query).await?;
        Ok(slim_query_results(&response))
    }

    /// Number of cached pages removed.
    pub async fn clear_cache(&self) -> Result<usize, AppError> {
        self.cache.clear_all().await
    }
}

/// The message printed after clearing the cache.
pub fn describe_cleared(count: usize) -> String {
    if count == 0 {
        "No cache to clear".to_string()
    } else {
        format!("Cleared {} cached page(s)", count)
    }
}
