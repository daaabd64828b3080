// tests/common/mod.rs
//! In-memory Notion workspace shared by the integration tests.
//!
//! Pages, child listings, and data sources are registered up front. Every
//! call is counted, listings can be slowed down per block, and the number
//! of listings in flight at once is tracked.

#![allow(dead_code)]

use noon::api::types::{PaginatedResponse, RawBlock, RawPage};
use noon::api::{DataSourceQuery, NotionRepository, SearchRequest};
use noon::{AppError, NotionId};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const PAGE_ID: &str = "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4";
pub const PAGE_ID_HYPHENATED: &str = "a1b2c3d4-e5f6-a1b2-c3d4-e5f6a1b2c3d4";

#[derive(Default)]
pub struct FakeNotion {
    pages: Mutex<HashMap<String, RawPage>>,
    /// Block id to its children, split into API pages.
    children: HashMap<String, Vec<Vec<RawBlock>>>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    data_source: Option<Value>,
    records: Vec<Value>,
    search_hits: Vec<Value>,

    pub page_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub other_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    listed: Mutex<Vec<String>>,
    last_query: Mutex<Option<DataSourceQuery>>,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, id: &str, title: &str, last_edited_time: &str) -> Self {
        self.set_page(id, title, last_edited_time);
        self
    }

    /// Children of `parent`, all in one API page.
    pub fn with_children(self, parent: &str, blocks: Vec<RawBlock>) -> Self {
        self.with_paged_children(parent, vec![blocks])
    }

    pub fn with_paged_children(mut self, parent: &str, pages: Vec<Vec<RawBlock>>) -> Self {
        self.children.insert(parent.to_string(), pages);
        self
    }

    pub fn with_delay(mut self, block_id: &str, delay: Duration) -> Self {
        self.delays.insert(block_id.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, block_id: &str) -> Self {
        self.failing.insert(block_id.to_string());
        self
    }

    pub fn with_data_source(mut self, data_source: Value) -> Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn with_records(mut self, records: Vec<Value>) -> Self {
        self.records = records;
        self
    }

    pub fn with_search_hits(mut self, hits: Vec<Value>) -> Self {
        self.search_hits = hits;
        self
    }

    /// Registers or replaces a page's metadata, e.g. to simulate an edit.
    pub fn set_page(&self, id: &str, title: &str, last_edited_time: &str) {
        let page = RawPage {
            id: id.to_string(),
            url: format!("https://www.notion.so/{}", id),
            last_edited_time: last_edited_time.to_string(),
            properties: json!({
                "Name": {"id": "title", "type": "title", "title": [{"plain_text": title}]}
            }),
        };
        self.pages.lock().unwrap().insert(id.to_string(), page);
    }

    pub fn set_page_properties(&self, id: &str, properties: Value) {
        if let Some(page) = self.pages.lock().unwrap().get_mut(id) {
            page.properties = properties;
        }
    }

    /// Block ids whose children were listed, in call order.
    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<DataSourceQuery> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn not_found(what: &str) -> AppError {
    AppError::NotionService {
        code: noon::NotionErrorCode::ObjectNotFound,
        message: format!("Could not find {}", what),
        status: reqwest::StatusCode::NOT_FOUND,
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeNotion {
    async fn retrieve_page(&self, id: &NotionId) -> Result<RawPage, AppError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| not_found(id.as_str()))
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<PaginatedResponse<RawBlock>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listed.lock().unwrap().push(block_id.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self
            .delays
            .get(block_id)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(block_id) {
            return Err(AppError::NotionService {
                code: noon::NotionErrorCode::ServiceUnavailable,
                message: format!("listing {} failed", block_id),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }

        let pages = self.children.get(block_id).cloned().unwrap_or_default();
        let index: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let results = pages.get(index).cloned().unwrap_or_default();
        let has_more = index + 1 < pages.len();
        Ok(PaginatedResponse {
            object: "list".to_string(),
            results,
            next_cursor: has_more.then(|| (index + 1).to_string()),
            has_more,
        })
    }

    async fn retrieve_data_source(&self, id: &NotionId) -> Result<Value, AppError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        self.data_source
            .clone()
            .ok_or_else(|| not_found(id.as_str()))
    }

    async fn query_data_source(
        &self,
        _id: &NotionId,
        query: &DataSourceQuery,
    ) -> Result<PaginatedResponse<Value>, AppError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        Ok(PaginatedResponse {
            object: "list".to_string(),
            results: self.records.clone(),
            next_cursor: Some("next-page".to_string()),
            has_more: true,
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<PaginatedResponse<Value>, AppError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        let hits = self
            .search_hits
            .iter()
            .filter(|hit| {
                let wanted = request
                    .filter
                    .as_ref()
                    .and_then(|f| f.get("value"))
                    .and_then(Value::as_str);
                wanted.is_none() || hit.get("object").and_then(Value::as_str) == wanted
            })
            .cloned()
            .collect();
        Ok(PaginatedResponse::last(hits))
    }
}

// ---------------------------------------------------------------------------
// Raw block builders
// ---------------------------------------------------------------------------

pub fn rich_text(content: &str) -> Value {
    json!([{
        "type": "text",
        "text": {"content": content, "link": null},
        "plain_text": content,
        "href": null,
        "annotations": {
            "bold": false, "italic": false, "strikethrough": false,
            "underline": false, "code": false, "color": "default"
        }
    }])
}

pub fn raw(id: &str, block_type: &str, payload: Value, has_children: bool) -> RawBlock {
    let mut value = json!({
        "object": "block",
        "id": id,
        "type": block_type,
        "has_children": has_children,
        "archived": false,
    });
    value[block_type] = payload;
    serde_json::from_value(value).unwrap()
}

pub fn text_block(id: &str, block_type: &str, content: &str) -> RawBlock {
    raw(id, block_type, json!({"rich_text": rich_text(content), "color": "default"}), false)
}

pub fn paragraph(id: &str, content: &str) -> RawBlock {
    text_block(id, "paragraph", content)
}

pub fn bullet(id: &str, content: &str) -> RawBlock {
    text_block(id, "bulleted_list_item", content)
}

pub fn parent(mut block: RawBlock) -> RawBlock {
    block.has_children = true;
    block
}
