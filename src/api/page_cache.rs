// src/api/page_cache.rs
//! Page cache gate: reuse a stored block tree while the page is unedited.
//!
//! A cached entry is valid for exactly one `last_edited_time`. There is no
//! TTL and no eviction; an entry is overwritten whole when the live page
//! has moved on, and removed only by [`PageCache::clear_all`].
//!
//! Cache operations are best-effort: an unreadable entry is a miss and a
//! failed write is logged, so a broken cache never blocks a fetch.

use super::tree_fetcher::TreeFetcher;
use super::types::RawPage;
use super::NotionRepository;
use crate::constants::APP_DIR_NAME;
use crate::error::AppError;
use crate::model::{CachedPage, LoadedPage, PageContent};
use crate::slim::slim_page;
use crate::types::NotionId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keyed store of [`CachedPage`] entries, one per normalized page id.
#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    /// The stored entry, or `None` if absent or unreadable.
    async fn get(&self, page_id: &str) -> Option<CachedPage>;

    /// Stores `entry` under its `page_id`, replacing any previous entry.
    async fn put(&self, entry: &CachedPage) -> Result<(), AppError>;

    /// Removes every entry and reports how many there were.
    async fn clear_all(&self) -> Result<usize, AppError>;
}

/// The storage key for a page id. Dashed and undashed forms of an id map to
/// the same key.
pub fn cache_key(page_id: &str) -> String {
    page_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

// ---------------------------------------------------------------------------
// Disk store
// ---------------------------------------------------------------------------

/// One `<id>.json` file per page under a cache directory.
pub struct DiskPageCache {
    cache_dir: PathBuf,
}

impl DiskPageCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// `noon/pages` under the platform cache directory
    /// (`$XDG_CACHE_HOME` or `~/.cache` on Linux).
    pub fn default_location() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(APP_DIR_NAME).join("pages"))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, page_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", cache_key(page_id)))
    }

    async fn read_entry(&self, path: &Path) -> Result<CachedPage, AppError> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|source| AppError::JsonParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl PageCache for DiskPageCache {
    async fn get(&self, page_id: &str) -> Option<CachedPage> {
        let path = self.entry_path(page_id);
        match self.read_entry(&path).await {
            Ok(entry) => Some(entry),
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::debug!("Ignoring unreadable cache entry: {}", e);
                None
            }
        }
    }

    async fn put(&self, entry: &CachedPage) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let path = self.entry_path(&entry.page_id);
        let json = serde_json::to_string(entry)?;

        // Write-then-rename so a reader never sees a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<usize, AppError> {
        let mut dir = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
        log::info!(
            "Removed {} cached page(s) from {}",
            removed,
            self.cache_dir.display()
        );
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A process-local store, used by tests and by callers that opt out of
/// persistence.
#[derive(Default)]
pub struct MemoryPageCache {
    entries: Mutex<HashMap<String, CachedPage>>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, page_id: &str) -> Option<CachedPage> {
        self.entries.lock().await.get(&cache_key(page_id)).cloned()
    }

    async fn put(&self, entry: &CachedPage) -> Result<(), AppError> {
        self.entries
            .lock()
            .await
            .insert(cache_key(&entry.page_id), entry.clone());
        Ok(())
    }

    async fn clear_all(&self) -> Result<usize, AppError> {
        let mut entries = self.entries.lock().await;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Loads pages through the cache, fetching a tree at most once per
/// `(page id, last_edited_time)`.
pub struct PageLoader {
    repository: Arc<dyn NotionRepository>,
    cache: Arc<dyn PageCache>,
    fetcher: TreeFetcher,
}

impl PageLoader {
    pub fn new(repository: Arc<dyn NotionRepository>, cache: Arc<dyn PageCache>) -> Self {
        let fetcher = TreeFetcher::new(Arc::clone(&repository));
        Self {
            repository,
            cache,
            fetcher,
        }
    }

    /// Returns the page and its blocks, from cache when the stored entry's
    /// edit time equals the live one.
    ///
    /// Page metadata is always fetched, because validity depends on it.
    pub async fn load(&self, id: &NotionId) -> Result<LoadedPage, AppError> {
        let live = self.repository.retrieve_page(id).await?;

        if let Some(cached) = self.cache.get(id.as_str()).await {
            if cached.last_edited_time == live.last_edited_time {
                log::debug!("Cache hit for page {} ({})", id, live.last_edited_time);
                return Ok(LoadedPage {
                    content: PageContent {
                        page: cached.page,
                        blocks: cached.blocks,
                    },
                    from_cache: true,
                });
            }
            log::debug!(
                "Cache stale for page {}: {} != {}",
                id,
                cached.last_edited_time,
                live.last_edited_time
            );
        }

        self.fetch_and_store(id, live).await
    }

    /// Fetches the tree regardless of what the cache holds, and stores it.
    pub async fn refresh(&self, id: &NotionId) -> Result<LoadedPage, AppError> {
        let live = self.repository.retrieve_page(id).await?;
        self.fetch_and_store(id, live).await
    }

    async fn fetch_and_store(&self, id: &NotionId, live: RawPage) -> Result<LoadedPage, AppError> {
        let blocks = self.fetcher.fetch_tree(&id.to_hyphenated()).await?;
        let page = slim_page(&live);

        let entry = CachedPage {
            page_id: id.as_str().to_string(),
            last_edited_time: live.last_edited_time,
            fetched_at: chrono::Utc::now().timestamp_millis(),
            page,
            blocks,
        };
        if let Err(e) = self.cache.put(&entry).await {
            log::warn!("Could not cache page {}: {}", id, e);
        }

        Ok(LoadedPage {
            content: PageContent {
                page: entry.page,
                blocks: entry.blocks,
            },
            from_cache: false,
        })
    }
}
