// src/mcp.rs
//! Minimal MCP (Model Context Protocol) server over stdio.
//!
//! Reads JSON-RPC 2.0 requests line by line and answers each on its own
//! line. Tool failures, including bad filter or sorts JSON, come back as
//! `isError` results; the server itself keeps running.

use crate::error::AppError;
use crate::formatting::{formatter_for, OutputFormat};
use crate::output;
use crate::pipeline::{describe_cleared, Workspace};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

const PROTOCOL_VERSION: &str = "2024-11-05";

// ── Tool descriptors ────────────────────────────────────────────────────────

fn tool_list() -> Value {
    json!([
        {
            "name": "noon_search",
            "description": "Search Notion pages and databases by keyword. Returns matching items with their ids and titles. Use noon_page for a page's content, and noon_database or noon_query for data_source results.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query":  { "type": "string", "description": "Search keyword" },
                    "cursor": { "type": "string", "description": "Pagination cursor from a previous next_cursor" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "noon_page",
            "description": "Get a Notion page with all nested blocks. Results are cached by last_edited_time. Use format 'markdown' for readable output.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id":     { "type": "string", "description": "Notion page id or URL" },
                    "format": { "type": "string", "enum": ["toon", "markdown", "json"], "description": "Output format (default toon)" }
                },
                "required": ["id"]
            }
        },
        {
            "name": "noon_database",
            "description": "Get a database's property schema: names, types, and options for select, multi_select, and status. Use it before building a query filter.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Data source id (from noon_search) or URL" }
                },
                "required": ["id"]
            }
        },
        {
            "name": "noon_query",
            "description": "Query database records with optional filter and sorts. Returns record ids, titles, urls, and properties.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id":     { "type": "string", "description": "Data source id (from noon_search) or URL" },
                    "filter": { "type": "string", "description": "Filter JSON, e.g. {\"property\":\"Status\",\"select\":{\"equals\":\"Done\"}}" },
                    "sorts":  { "type": "string", "description": "Sorts JSON array, e.g. [{\"property\":\"Created\",\"direction\":\"descending\"}]" },
                    "cursor": { "type": "string", "description": "Pagination cursor from a previous next_cursor" }
                },
                "required": ["id"]
            }
        },
        {
            "name": "noon_clear_cache",
            "description": "Clear all cached Notion pages, forcing fresh data on the next read.",
            "inputSchema": { "type": "object", "properties": {} }
        }
    ])
}

// ── JSON-RPC helpers ────────────────────────────────────────────────────────

fn jsonrpc_ok(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn jsonrpc_error(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

fn tool_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, AppError> {
    str_arg(args, key).ok_or_else(|| {
        AppError::InvalidArgument(format!("missing required argument: {}", key))
    })
}

// ── Server ──────────────────────────────────────────────────────────────────

pub struct McpServer {
    workspace: Workspace,
    initialized: bool,
}

impl McpServer {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            initialized: false,
        }
    }

    /// Serves stdin/stdout until stdin closes.
    pub async fn run_stdio(&mut self) -> Result<(), AppError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        log::info!("MCP server listening on stdio");
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(line).await {
                writer.write_all(response.to_string().as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        log::info!("MCP client disconnected");
        Ok(())
    }

    /// The response to one request line, or `None` for notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<Value> {
        let request: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return Some(jsonrpc_error(
                    &Value::Null,
                    -32700,
                    &format!("parse error: {}", e),
                ))
            }
        };

        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(json!({}));
        log::debug!("MCP request: {}", method);

        let response = match method {
            "initialize" => {
                self.initialized = true;
                jsonrpc_ok(
                    &id,
                    json!({
                        "protocolVersion": PROTOCOL_VERSION,
                        "capabilities": {
                            "tools": { "listChanged": false }
                        },
                        "serverInfo": {
                            "name": "noon",
                            "version": env!("CARGO_PKG_VERSION"),
                        }
                    }),
                )
            }
            m if m.starts_with("notifications/") => return None,
            "ping" => jsonrpc_ok(&id, json!({})),
            "tools/list" if !self.initialized => jsonrpc_error(&id, -32600, "not initialized"),
            "tools/list" => jsonrpc_ok(&id, json!({ "tools": tool_list() })),
            "tools/call" if !self.initialized => jsonrpc_error(&id, -32600, "not initialized"),
            "tools/call" => {
                let name = params.get("name").and_then(Value::as_str).unwrap_or("");
                let args = params.get("arguments").cloned().unwrap_or(json!({}));
                let result = match self.call_tool(name, &args).await {
                    Ok(text) => tool_result(text, false),
                    Err(e) => {
                        log::warn!("Tool {} failed: {}", name, e);
                        let text = match e.hint() {
                            Some(hint) => format!("Error: {}\n{}", e, hint),
                            None => format!("Error: {}", e),
                        };
                        tool_result(text, true)
                    }
                };
                jsonrpc_ok(&id, result)
            }
            _ => jsonrpc_error(&id, -32601, &format!("unknown method: {}", method)),
        };
        Some(response)
    }

    async fn call_tool(&self, name: &str, args: &Value) -> Result<String, AppError> {
        match name {
            "noon_search" => {
                let query = require_str(args, "query")?;
                let cursor = str_arg(args, "cursor").map(str::to_string);
                let results = self.workspace.search(query, None, cursor).await?;
                output::render(&results, false)
            }
            "noon_page" => {
                let id = require_str(args, "id")?;
                let format = match str_arg(args, "format") {
                    Some(name) => OutputFormat::from_name(name).ok_or_else(|| {
                        AppError::InvalidArgument(format!("unknown format: {}", name))
                    })?,
                    None => OutputFormat::Toon,
                };
                let loaded = self.workspace.page(id, false).await?;
                formatter_for(format, false).format_page(&loaded.content)
            }
            "noon_database" => {
                let id = require_str(args, "id")?;
                let schema = self.workspace.database(id).await?;
                output::render(&schema, false)
            }
            "noon_query" => {
                let id = require_str(args, "id")?;
                let results = self
                    .workspace
                    .query(
                        id,
                        str_arg(args, "filter"),
                        str_arg(args, "sorts"),
                        str_arg(args, "cursor").map(str::to_string),
                    )
                    .await?;
                output::render(&results, false)
            }
            "noon_clear_cache" => Ok(describe_cleared(self.workspace.clear_cache().await?)),
            other => Err(AppError::InvalidArgument(format!("unknown tool: {}", other))),
        }
    }
}

/// `claude mcp add` command line for this executable.
pub fn install_command(executable: &str, local: bool) -> String {
    let scope = if local { "local" } else { "user" };
    format!("claude mcp add noon --scope {} -- {} mcp", scope, executable)
}

/// `mcpServers` configuration snippet for this executable.
pub fn server_config(executable: &str) -> Value {
    json!({
        "mcpServers": {
            "noon": {
                "command": executable,
                "args": ["mcp"],
            }
        }
    })
}
