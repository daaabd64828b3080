// tests/workspace_operations.rs
//! The shared CLI/MCP operations: cached page loads, search, query, and
//! schema reads.

mod common;

use common::*;
use noon::api::{DiskPageCache, MemoryPageCache, PageCache, SearchObject};
use noon::pipeline::describe_cleared;
use noon::{AppError, PropertyValue, Workspace};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const EDITED: &str = "2024-05-01T10:00:00.000Z";
const EDITED_LATER: &str = "2024-05-02T08:30:00.000Z";

fn sample_page() -> FakeNotion {
    FakeNotion::new()
        .with_page(PAGE_ID, "Meeting Notes", EDITED)
        .with_children(
            PAGE_ID_HYPHENATED,
            vec![paragraph("p1", "Agenda"), parent(bullet("b1", "Budget"))],
        )
        .with_children("b1", vec![bullet("b2", "Q3 numbers")])
}

// ---------------------------------------------------------------------------
// Page cache gate
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_unchanged_page_is_served_from_cache() {
    let fake = Arc::new(sample_page());
    let workspace = Workspace::new(fake.clone(), Arc::new(MemoryPageCache::new()));

    let first = workspace.page(PAGE_ID, false).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(fake.lists(), 2);

    let second = workspace.page(PAGE_ID, false).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.content, first.content);
    assert_eq!(fake.lists(), 2, "a cache hit must not list any children");
    assert_eq!(
        fake.page_calls.load(std::sync::atomic::Ordering::SeqCst),
        2,
        "metadata is fetched on every load"
    );
}

#[tokio::test(start_paused = true)]
async fn test_edited_page_is_refetched_and_restored() {
    let fake = Arc::new(sample_page());
    let cache = Arc::new(MemoryPageCache::new());
    let workspace = Workspace::new(fake.clone(), cache.clone());

    workspace.page(PAGE_ID, false).await.unwrap();
    fake.set_page(PAGE_ID, "Meeting Notes (final)", EDITED_LATER);

    let reloaded = workspace.page(PAGE_ID, false).await.unwrap();
    assert!(!reloaded.from_cache);
    assert_eq!(reloaded.content.page.title, "Meeting Notes (final)");
    assert_eq!(fake.lists(), 4);

    let stored = cache.get(PAGE_ID).await.unwrap();
    assert_eq!(stored.last_edited_time, EDITED_LATER);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_bypasses_a_valid_entry() {
    let fake = Arc::new(sample_page());
    let workspace = Workspace::new(fake.clone(), Arc::new(MemoryPageCache::new()));

    workspace.page(PAGE_ID, false).await.unwrap();
    let refreshed = workspace.page(PAGE_ID, true).await.unwrap();

    assert!(!refreshed.from_cache);
    assert_eq!(fake.lists(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_page_url_and_dashed_id_share_the_cache_entry() {
    let fake = Arc::new(sample_page());
    let workspace = Workspace::new(fake.clone(), Arc::new(MemoryPageCache::new()));

    let url = format!("https://www.notion.so/acme/Meeting-Notes-{}?pvs=4", PAGE_ID);
    workspace.page(&url, false).await.unwrap();
    let again = workspace.page(PAGE_ID_HYPHENATED, false).await.unwrap();

    assert!(again.from_cache);
}

#[tokio::test(start_paused = true)]
async fn test_missing_page_propagates_not_found() {
    let workspace = Workspace::new(Arc::new(FakeNotion::new()), Arc::new(MemoryPageCache::new()));
    let err = workspace.page(PAGE_ID, false).await.unwrap_err();
    assert!(err.notion_code().is_some_and(|code| code.is_not_found()));
}

#[tokio::test]
async fn test_disk_cache_survives_a_new_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(sample_page());

    let first = Workspace::new(fake.clone(), Arc::new(DiskPageCache::new(dir.path())));
    first.page(PAGE_ID, false).await.unwrap();

    let second = Workspace::new(fake.clone(), Arc::new(DiskPageCache::new(dir.path())));
    let loaded = second.page(PAGE_ID, false).await.unwrap();
    assert!(loaded.from_cache);
    assert_eq!(loaded.content.blocks.len(), 2);
    assert_eq!(loaded.content.blocks[1].children.len(), 1);

    let cleared = second.clear_cache().await.unwrap();
    assert_eq!(describe_cleared(cleared), "Cleared 1 cached page(s)");
    assert_eq!(describe_cleared(second.clear_cache().await.unwrap()), "No cache to clear");
}

#[tokio::test]
async fn test_corrupt_cache_file_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", PAGE_ID)), "{ not json").unwrap();

    let fake = Arc::new(sample_page());
    let workspace = Workspace::new(fake.clone(), Arc::new(DiskPageCache::new(dir.path())));
    let loaded = workspace.page(PAGE_ID, false).await.unwrap();

    assert!(!loaded.from_cache);
    assert_eq!(fake.lists(), 2);
    // The corrupt file was replaced by a good entry.
    assert!(workspace.page(PAGE_ID, false).await.unwrap().from_cache);
}

// ---------------------------------------------------------------------------
// Search, query, schema
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_slims_hits_and_applies_object_filter() {
    let fake = FakeNotion::new().with_search_hits(vec![
        json!({
            "object": "page",
            "id": "p1",
            "properties": {"Name": {"type": "title", "title": [{"plain_text": "Roadmap"}]}},
            "url": "https://www.notion.so/p1"
        }),
        json!({
            "object": "data_source",
            "id": "ds1",
            "title": [{"plain_text": "Tasks"}]
        }),
    ]);
    let workspace = Workspace::new(Arc::new(fake), Arc::new(MemoryPageCache::new()));

    let all = workspace.search("road", None, None).await.unwrap();
    let titles: Vec<&str> = all.results.iter().map(|hit| hit.title.as_str()).collect();
    assert_eq!(titles, vec!["Roadmap", "Tasks"]);
    assert!(!all.has_more);
    assert_eq!(all.next_cursor, None);

    let databases = workspace
        .search("road", Some(SearchObject::DataSource), None)
        .await
        .unwrap();
    assert_eq!(databases.results.len(), 1);
    assert_eq!(databases.results[0].object, "data_source");
    assert_eq!(databases.results[0].id, "ds1");
}

#[tokio::test]
async fn test_query_passes_parsed_filter_and_slims_records() {
    let fake = Arc::new(FakeNotion::new().with_records(vec![json!({
        "object": "page",
        "id": "r1",
        "url": "https://www.notion.so/r1",
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": "Fix login"}]},
            "Status": {"type": "status", "status": {"name": "Done"}},
            "Points": {"type": "number", "number": 3}
        }
    })]));
    let workspace = Workspace::new(fake.clone(), Arc::new(MemoryPageCache::new()));

    let results = workspace
        .query(
            "ds1",
            Some(r#"{"property":"Status","status":{"equals":"Done"}}"#),
            Some(r#"[{"property":"Points","direction":"descending"}]"#),
            Some("cursor-1".to_string()),
        )
        .await
        .unwrap();

    let record = &results.results[0];
    assert_eq!(record.title, "Fix login");
    assert_eq!(record.url, "https://www.notion.so/r1");
    assert_eq!(record.properties.get("Status"), Some(&PropertyValue::text("Done")));
    assert_eq!(record.properties.get("Points"), Some(&PropertyValue::from(3i64)));
    assert!(results.has_more);
    assert_eq!(results.next_cursor.as_deref(), Some("next-page"));

    let sent = fake.last_query().unwrap();
    assert_eq!(
        sent.filter,
        Some(json!({"property": "Status", "status": {"equals": "Done"}}))
    );
    assert_eq!(
        sent.sorts,
        Some(vec![json!({"property": "Points", "direction": "descending"})])
    );
    assert_eq!(sent.start_cursor.as_deref(), Some("cursor-1"));
}

#[tokio::test]
async fn test_invalid_filter_fails_before_any_request() {
    let fake = Arc::new(FakeNotion::new());
    let workspace = Workspace::new(fake.clone(), Arc::new(MemoryPageCache::new()));

    let err = workspace
        .query("ds1", Some("{status: done}"), None, None)
        .await
        .unwrap_err();

    match err {
        AppError::QueryParse(parse) => assert!(parse.is_syntax_error()),
        other => panic!("expected a query parse error, got {:?}", other),
    }
    assert_eq!(fake.other_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_array_sorts_are_rejected() {
    let workspace = Workspace::new(Arc::new(FakeNotion::new()), Arc::new(MemoryPageCache::new()));
    let err = workspace
        .query("ds1", None, Some(r#"{"property":"Points"}"#), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid sorts: sorts must be an array");
}

#[tokio::test]
async fn test_database_schema_lists_options() {
    let fake = FakeNotion::new().with_data_source(json!({
        "object": "data_source",
        "id": "ds1",
        "title": [{"plain_text": "Tasks"}],
        "properties": {
            "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
            "Status": {"id": "s", "name": "Status", "type": "select", "select": {
                "options": [{"id": "1", "name": "Todo", "color": "red"}, {"id": "2", "name": "Done", "color": "green"}]
            }}
        }
    }));
    let workspace = Workspace::new(Arc::new(fake), Arc::new(MemoryPageCache::new()));

    let schema = workspace.database("ds1").await.unwrap();
    assert_eq!(schema.id, "ds1");
    assert_eq!(schema.title, "Tasks");

    let value = serde_json::to_value(&schema.properties).unwrap();
    assert_eq!(
        value,
        json!([
            {"name": "Name", "type": "title"},
            {"name": "Status", "type": "select", "options": [
                {"name": "Todo", "color": "red"},
                {"name": "Done", "color": "green"}
            ]}
        ])
    );
}
