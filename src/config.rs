// src/config.rs
//! Command-line definition and the persisted configuration file.
//!
//! The config file holds OAuth client credentials and the stored token.
//! It is JSON at `$XDG_CONFIG_HOME/noon/config.json` (or
//! `~/.config/noon/config.json`). A missing or unreadable file is the same
//! as an empty one.

use crate::api::SearchObject;
use crate::constants::{
    APP_DIR_NAME, CONFIG_DIR_ENV_VAR, CONFIG_FILE_NAME, TOKEN_EXPIRY_SKEW_MS,
};
use crate::error::AppError;
use crate::formatting::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(name = "noon", author, version, about = "Lightweight Notion CLI and MCP server", long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search pages and databases shared with the integration
    Search {
        query: String,

        /// Only return pages or only databases
        #[arg(long, value_enum)]
        filter: Option<SearchFilter>,

        /// Cursor from a previous result's next_cursor
        #[arg(long)]
        cursor: Option<String>,

        /// Output as JSON instead of TOON
        #[arg(long)]
        json: bool,
    },

    /// Get a page and its full content (id or URL)
    Page {
        id: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Toon)]
        format: OutputFormat,

        /// Keep link targets in TOON output
        #[arg(long)]
        links: bool,

        /// Ignore the page cache and fetch fresh content
        #[arg(long)]
        no_cache: bool,
    },

    /// Show a database's property schema (id or URL)
    Database {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Query database records (id or URL)
    Query {
        id: String,

        /// Notion filter object as JSON
        #[arg(long)]
        filter: Option<String>,

        /// Notion sorts array as JSON
        #[arg(long)]
        sorts: Option<String>,

        #[arg(long)]
        cursor: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Manage the page cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Store an access token (integration secret or OAuth token)
    Auth {
        #[arg(long)]
        token: String,
    },

    /// Remove the stored token
    Logout,

    /// Show credential and authentication status
    Status,

    /// Show or set OAuth client credentials
    Config {
        #[arg(long, requires = "client_secret")]
        client_id: Option<String>,

        #[arg(long, requires = "client_id")]
        client_secret: Option<String>,
    },

    /// Run as an MCP server over stdio, or print its registration
    Mcp {
        #[command(subcommand)]
        action: Option<McpAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CacheAction {
    /// Delete every cached page
    Clear,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum McpAction {
    /// Print the command that registers this server
    Install {
        /// Register for the current project only
        #[arg(long)]
        local: bool,
    },
    /// Print an mcpServers JSON snippet
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchFilter {
    Page,
    Database,
}

impl From<SearchFilter> for SearchObject {
    fn from(filter: SearchFilter) -> Self {
        match filter {
            SearchFilter::Page => SearchObject::Page,
            SearchFilter::Database => SearchObject::DataSource,
        }
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<StoredToken>,
}

/// An access token as persisted, with its refresh data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
}

impl StoredToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Tokens without an expiry never expire. Others expire one minute
    /// early.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_ms >= expires_at - TOKEN_EXPIRY_SKEW_MS,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn workspace_label(&self) -> &str {
        self.workspace_name
            .as_deref()
            .or(self.workspace_id.as_deref())
            .unwrap_or("unknown")
    }
}

/// Reads and writes `config.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$NOON_CONFIG_DIR/config.json` when set, otherwise `noon/config.json`
    /// under the platform config directory (`$XDG_CONFIG_HOME` or
    /// `~/.config` on Linux).
    pub fn default_location() -> Self {
        Self::in_dir(Self::config_dir(std::env::var_os(CONFIG_DIR_ENV_VAR)))
    }

    fn config_dir(override_dir: Option<std::ffi::OsString>) -> PathBuf {
        match override_dir.filter(|dir| !dir.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR_NAME),
        }
    }

    /// The store for `config.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored configuration, or an empty one if the file is missing
    /// or cannot be parsed.
    pub async fn load(&self) -> ConfigFile {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not read {}: {}", self.path.display(), e);
                }
                return ConfigFile::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {}", self.path.display(), e);
            ConfigFile::default()
        })
    }

    pub async fn save(&self, config: &ConfigFile) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json).await?;
        log::debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    /// Loads, applies `change`, and saves.
    pub async fn update<F>(&self, change: F) -> Result<ConfigFile, AppError>
    where
        F: FnOnce(&mut ConfigFile),
    {
        let mut config = self.load().await;
        change(&mut config);
        self.save(&config).await?;
        Ok(config)
    }
}

/// `***` followed by the last four characters, for display.
pub fn mask_secret(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("***{}", tail)
}
