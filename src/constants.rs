// src/constants.rs
//! Constants that define the operational boundaries of the system.
//!
//! Each constant is named for the concept it constrains. Reading these
//! should tell you how the tool talks to Notion and how it lays out output.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// Base URL of the public Notion REST API.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// Notion-Version header sent with every request.
///
/// Data sources (`/v1/data_sources/...`) only exist from this version on.
pub const NOTION_API_VERSION: &str = "2025-09-03";

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips during recursive fetching.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// How many "list block children" calls may be in flight at once.
///
/// Notion rate-limits integrations to roughly three requests per second.
/// The recursive tree fetcher admits every listing call through a gate
/// of this size.
pub const CHILD_LISTING_CONCURRENCY: usize = 3;

/// A stored OAuth token is treated as expired this long before its
/// recorded expiry, so a request never races the deadline.
pub const TOKEN_EXPIRY_SKEW_MS: i64 = 60_000;

// ---------------------------------------------------------------------------
// Local state
// ---------------------------------------------------------------------------

/// Directory name used under the config and cache roots.
pub const APP_DIR_NAME: &str = "noon";

/// File holding credentials and the stored token.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable that replaces the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "NOON_CONFIG_DIR";

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Number of spaces per indentation level in formatted output.
pub const INDENT_SPACES: usize = 2;

/// Title used when a page, database, or search hit has no title text.
pub const UNTITLED: &str = "(untitled)";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing response bodies in errors.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// OAuth token endpoint, used for refresh-token exchange.
pub const NOTION_OAUTH_TOKEN_URL: &str = "https://api.notion.com/v1/oauth/token";
