// src/api/simple_pagination.rs
//! Cursor-following pagination over async closures.

use super::types::PaginatedResponse;
use crate::error::AppError;

/// Calls `fetch_fn` with each successive cursor (starting from none) and
/// concatenates the results in response order.
///
/// Stops when a page reports `has_more: false` or carries no cursor.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_fn: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_fn(cursor).await?;
        pages_fetched += 1;

        all_items.extend(response.results);
        cursor = response.next_cursor;

        if !response.has_more || cursor.is_none() {
            break;
        }
    }

    if pages_fetched > 1 {
        log::debug!(
            "Collected {} items across {} pages",
            all_items.len(),
            pages_fetched
        );
    }
    Ok(all_items)
}
