// src/api/tree_fetcher.rs
//! Recursive materialization of a block tree.
//!
//! Siblings are listed page by page, then every child that has nested
//! content is descended into concurrently. Each individual "list children"
//! call is admitted through a shared semaphore, so no more than
//! [`CHILD_LISTING_CONCURRENCY`] listing requests are in flight for the
//! whole tree at any moment.
//!
//! Output order never depends on completion order: children are joined
//! with [`try_join_all`], which yields results by input position.

use super::simple_pagination::fetch_all_pages;
use super::types::RawBlock;
use super::NotionRepository;
use crate::constants::CHILD_LISTING_CONCURRENCY;
use crate::error::AppError;
use crate::model::{BlockType, SlimBlock};
use crate::slim::slim_block;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fetches and slims the full descendant tree of a block.
pub struct TreeFetcher {
    repository: Arc<dyn NotionRepository>,
    gate: Semaphore,
}

impl TreeFetcher {
    pub fn new(repository: Arc<dyn NotionRepository>) -> Self {
        Self::with_concurrency(repository, CHILD_LISTING_CONCURRENCY)
    }

    /// A fetcher admitting at most `limit` concurrent listing calls.
    pub fn with_concurrency(repository: Arc<dyn NotionRepository>, limit: usize) -> Self {
        Self {
            repository,
            gate: Semaphore::new(limit.max(1)),
        }
    }

    /// Every descendant of `root_id`, slimmed, in document order.
    ///
    /// The first listing failure anywhere in the tree aborts the whole
    /// fetch; no partial tree is returned.
    pub async fn fetch_tree(&self, root_id: &str) -> Result<Vec<SlimBlock>, AppError> {
        log::debug!("Fetching block tree under {}", root_id);
        let blocks = self.fetch_children(root_id).await?;
        log::debug!("Fetched {} top-level blocks under {}", blocks.len(), root_id);
        Ok(blocks)
    }

    // Boxed so the recursion through `materialize` has a finite size.
    fn fetch_children<'a>(
        &'a self,
        parent_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SlimBlock>, AppError>> {
        async move {
            let raw = self.list_gated(parent_id).await?;
            try_join_all(raw.iter().map(|block| self.materialize(block))).await
        }
        .boxed()
    }

    async fn materialize(&self, block: &RawBlock) -> Result<SlimBlock, AppError> {
        let slim = slim_block(block);
        let boundary = BlockType::from_name(&block.block_type).is_boundary();
        if !block.has_children || boundary {
            return Ok(slim);
        }
        let children = self.fetch_children(&block.id).await?;
        Ok(slim.with_children(children))
    }

    /// All children of one block. The permit covers a single HTTP call,
    /// not the recursion below it.
    async fn list_gated(&self, block_id: &str) -> Result<Vec<RawBlock>, AppError> {
        fetch_all_pages(|cursor| async move {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| AppError::InternalError {
                    message: "child listing gate was closed".to_string(),
                    source: Some(Box::new(e)),
                })?;
            self.repository
                .list_children(block_id, cursor.as_deref())
                .await
        })
        .await
    }
}
