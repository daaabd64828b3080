// src/api/parser.rs
//! Response decoding, with Notion error bodies parsed by notion-client.

use super::client::ApiResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use notion_client::objects::error::Error as NotionError;
use reqwest::StatusCode;

/// Decodes a successful body into `T`, or turns an error body into a
/// typed error.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: preview(body),
        }
        .into()
    })
}

/// Prefers Notion's own `{status, code, message}` error object and falls
/// back to the bare HTTP status.
fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    if let Ok(notion_error) = serde_json::from_str::<NotionError>(body) {
        log::debug!(
            "Notion error from {}: {} ({})",
            url,
            notion_error.code,
            notion_error.message
        );
        return NotionClientError::from(notion_error).into();
    }

    AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}", status, url),
        status,
    }
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_LENGTH) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
