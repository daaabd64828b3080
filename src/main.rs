// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use noon::api::{DiskPageCache, NotionRepository, PageCache};
use noon::auth::{ClientCredentials, StoredTokenProvider};
use noon::config::{
    mask_secret, CacheAction, Command, CommandLineInput, ConfigStore, McpAction, StoredToken,
};
use noon::error::AppError;
use noon::formatting::formatter_for;
use noon::mcp::{install_command, server_config, McpServer};
use noon::output;
use noon::pipeline::{describe_cleared, Workspace};
use noon::session::NotionSession;
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// The console appender writes to stderr; stdout belongs to command
/// output and the MCP protocol.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("noon.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// The workspace backed by the stored credentials and the on-disk cache.
fn open_workspace(store: ConfigStore) -> Workspace {
    let repository: Arc<dyn NotionRepository> = Arc::new(NotionSession::new(Arc::new(
        StoredTokenProvider::new(store),
    )));
    let cache: Arc<dyn PageCache> = Arc::new(DiskPageCache::default_location());
    Workspace::new(repository, cache)
}

fn current_executable() -> anyhow::Result<String> {
    let path = std::env::current_exe().context("Could not locate the noon executable")?;
    Ok(path.display().to_string())
}

async fn print_status(store: &ConfigStore) {
    let config = store.load().await;

    match ClientCredentials::resolve(&config) {
        Some(credentials) => println!(
            "✅ Client credentials configured ({})",
            credentials.source.label()
        ),
        None => {
            println!("❌ Client credentials not configured");
            println!("   Run: noon config --client-id <id> --client-secret <secret>");
        }
    }

    if std::env::var("NOTION_TOKEN").is_ok_and(|token| !token.is_empty()) {
        println!("✅ Authenticated (NOTION_TOKEN)");
        return;
    }

    match &config.token {
        Some(token) => {
            println!("✅ Authenticated");
            println!("   Workspace: {}", token.workspace_label());
            if let Some(expires_at) = token.expires_at {
                if token.is_expired() {
                    println!("   Token expired (will refresh on next request)");
                } else {
                    let remaining_ms = expires_at - chrono::Utc::now().timestamp_millis();
                    println!("   Token expires in: {} minutes", remaining_ms / 60_000);
                }
            }
        }
        None => {
            println!("❌ Not authenticated");
            println!("   Run: noon auth --token <token>");
        }
    }
}

async fn print_config(store: &ConfigStore) {
    let config = store.load().await;
    let show = |value: &Option<String>| {
        value
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set)".to_string())
    };
    println!("Current configuration:");
    println!("  Client ID: {}", show(&config.client_id));
    println!("  Client Secret: {}", show(&config.client_secret));
    println!("  File: {}", store.path().display());
}

async fn run(cli: CommandLineInput) -> anyhow::Result<()> {
    let store = ConfigStore::default_location();

    match cli.command {
        Command::Search {
            query,
            filter,
            cursor,
            json,
        } => {
            let workspace = open_workspace(store);
            let results = workspace
                .search(&query, filter.map(Into::into), cursor)
                .await?;
            output::print(&results, json)?;
        }
        Command::Page {
            id,
            format,
            links,
            no_cache,
        } => {
            let workspace = open_workspace(store);
            let loaded = workspace.page(&id, no_cache).await?;
            let rendered = formatter_for(format, links).format_page(&loaded.content)?;
            println!("{}", rendered);
        }
        Command::Database { id, json } => {
            let workspace = open_workspace(store);
            output::print(&workspace.database(&id).await?, json)?;
        }
        Command::Query {
            id,
            filter,
            sorts,
            cursor,
            json,
        } => {
            let workspace = open_workspace(store);
            let results = workspace
                .query(&id, filter.as_deref(), sorts.as_deref(), cursor)
                .await?;
            output::print(&results, json)?;
        }
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            let workspace = open_workspace(store);
            println!("{}", describe_cleared(workspace.clear_cache().await?));
        }
        Command::Auth { token } => {
            store
                .update(|config| config.token = Some(StoredToken::new(token)))
                .await
                .context("Could not save the token")?;
            println!("✅ Token saved to {}", store.path().display());
        }
        Command::Logout => {
            store.update(|config| config.token = None).await?;
            println!("✅ Logged out successfully");
        }
        Command::Status => print_status(&store).await,
        Command::Config {
            client_id: Some(client_id),
            client_secret: Some(client_secret),
        } => {
            store
                .update(|config| {
                    config.client_id = Some(client_id);
                    config.client_secret = Some(client_secret);
                })
                .await?;
            println!("✅ Client credentials saved");
        }
        Command::Config { .. } => print_config(&store).await,
        Command::Mcp { action: None } => {
            let mut server = McpServer::new(open_workspace(store));
            server.run_stdio().await?;
        }
        Command::Mcp {
            action: Some(McpAction::Install { local }),
        } => {
            println!("{}", install_command(&current_executable()?, local));
        }
        Command::Mcp {
            action: Some(McpAction::Config),
        } => {
            let snippet = server_config(&current_executable()?);
            println!("{}", serde_json::to_string_pretty(&snippet)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CommandLineInput::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    if let Err(e) = run(cli).await {
        log::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        if let Some(hint) = e.downcast_ref::<AppError>().and_then(AppError::hint) {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}
