// src/session.rs
//! An authenticated connection to Notion, built once on first use.
//!
//! Constructed explicitly and passed down the call chain; there is no
//! process-wide client. The first request resolves a token and builds the
//! HTTP client, concurrent first requests share that single
//! initialization.

use crate::api::types::{PaginatedResponse, RawBlock, RawPage};
use crate::api::{DataSourceQuery, NotionHttpClient, NotionRepository, SearchRequest};
use crate::auth::TokenProvider;
use crate::error::AppError;
use crate::types::NotionId;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct NotionSession {
    tokens: Arc<dyn TokenProvider>,
    client: OnceCell<NotionHttpClient>,
}

impl NotionSession {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&NotionHttpClient, AppError> {
        self.client
            .get_or_try_init(|| async {
                let token = self.tokens.access_token().await?;
                log::debug!("Creating authenticated Notion client");
                NotionHttpClient::new(&token)
            })
            .await
    }
}

#[async_trait::async_trait]
impl NotionRepository for NotionSession {
    async fn retrieve_page(&self, id: &NotionId) -> Result<RawPage, AppError> {
        self.client().await?.retrieve_page(id).await
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<PaginatedResponse<RawBlock>, AppError> {
        self.client().await?.list_children(block_id, cursor).await
    }

    async fn retrieve_data_source(&self, id: &NotionId) -> Result<Value, AppError> {
        self.client().await?.retrieve_data_source(id).await
    }

    async fn query_data_source(
        &self,
        id: &NotionId,
        query: &DataSourceQuery,
    ) -> Result<PaginatedResponse<Value>, AppError> {
        self.client().await?.query_data_source(id, query).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<PaginatedResponse<Value>, AppError> {
        self.client().await?.search(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTokens(AtomicUsize);

    #[async_trait::async_trait]
    impl TokenProvider for CountingTokens {
        async fn access_token(&self) -> Result<String, AppError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok("secret_test".to_string())
        }
    }

    struct NoToken;

    #[async_trait::async_trait]
    impl TokenProvider for NoToken {
        async fn access_token(&self) -> Result<String, AppError> {
            Err(AppError::MissingConfiguration("no token".to_string()))
        }
    }

    #[tokio::test]
    async fn test_client_is_built_once() {
        let tokens = Arc::new(CountingTokens(AtomicUsize::new(0)));
        let session = NotionSession::new(tokens.clone());
        session.client().await.unwrap();
        session.client().await.unwrap();
        assert_eq!(tokens.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_failure_surfaces_on_first_request() {
        let session = NotionSession::new(Arc::new(NoToken));
        let id = NotionId::parse("a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4").unwrap();
        let err = session.retrieve_page(&id).await.unwrap_err();
        assert!(matches!(err, AppError::MissingConfiguration(_)));
    }
}
