// src/api/client.rs
//! Thin HTTP client for the Notion API.
//!
//! Wraps reqwest with the authentication and version headers every call
//! needs. Response decoding is left to [`super::parser`].

use crate::constants::{NOTION_API_BASE_URL, NOTION_API_PAGE_SIZE, NOTION_API_VERSION};
use crate::error::AppError;
use crate::types::NotionId;
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::Value;

use super::parser::parse_api_response;
use super::types::{PaginatedResponse, RawBlock, RawPage};
use super::{DataSourceQuery, SearchRequest};

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client authenticated with `access_token`.
    pub fn new(access_token: &str) -> Result<Self, AppError> {
        Self::with_base_url(access_token, NOTION_API_BASE_URL)
    }

    /// Same as [`new`](Self::new) against a different API root.
    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(access_token)?)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(access_token: &str) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", access_token);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to `endpoint` (a path below the API root).
    pub async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).query(query).send().await?)
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &NotionId) -> Result<RawPage, AppError> {
        let endpoint = format!("pages/{}", id.to_hyphenated());
        let response = self.get(&endpoint, &[]).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<PaginatedResponse<RawBlock>, AppError> {
        let endpoint = format!("blocks/{}/children", block_id);
        let mut query = vec![("page_size", NOTION_API_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }
        let response = self.get(&endpoint, &query).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn retrieve_data_source(&self, id: &NotionId) -> Result<Value, AppError> {
        let endpoint = format!("data_sources/{}", id.to_hyphenated());
        let response = self.get(&endpoint, &[]).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn query_data_source(
        &self,
        id: &NotionId,
        query: &DataSourceQuery,
    ) -> Result<PaginatedResponse<Value>, AppError> {
        let endpoint = format!("data_sources/{}/query", id.to_hyphenated());
        let response = self.post(&endpoint, query).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn search(&self, request: &SearchRequest) -> Result<PaginatedResponse<Value>, AppError> {
        let response = self.post("search", request).await?;
        parse_api_response(extract_response_text(response).await?)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text along with status and URL.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
