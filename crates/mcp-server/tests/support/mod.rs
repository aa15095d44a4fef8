#![allow(dead_code)] // each suite uses a different subset of the helpers

//! Shared helpers for the MCP integration suites.
//!
//! Every suite spawns the real binary over stdio and keeps it offline:
//! upstream base URLs point at an unroutable port, so only behaviors that
//! must work without the network are asserted.

use anyhow::{Context, Result};
use rmcp::model::CallToolRequestParams;
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Unroutable meta-search endpoint: connection refused, instantly.
pub const DEAD_SEARX_URL: &str = "http://127.0.0.1:9/search";

pub fn locate_server_bin() -> Result<PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_web-research-mcp") {
        return Ok(PathBuf::from(path));
    }

    // Cargo doesn't always expose CARGO_BIN_EXE_* at runtime. Derive it
    // from the test exe path: `.../target/{profile}/deps/<test>` →
    // `.../target/{profile}/web-research-mcp`.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(profile_dir) = exe.parent().and_then(|p| p.parent()) {
            let candidate = profile_dir.join("web-research-mcp");
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir
        .ancestors()
        .nth(2)
        .context("failed to resolve repo root from CARGO_MANIFEST_DIR")?;
    for rel in [
        "target/debug/web-research-mcp",
        "target/release/web-research-mcp",
    ] {
        let candidate = repo_root.join(rel);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!("failed to locate web-research-mcp binary")
}

/// Spawn the server offline, with the usage log redirected into `usage_path`.
pub async fn spawn_server(usage_path: &Path) -> Result<RunningService<RoleClient, ()>> {
    let bin = locate_server_bin()?;
    let mut cmd = Command::new(bin);
    cmd.env("SEARXNG_BASE_URL", DEAD_SEARX_URL);
    cmd.env("RESEARCH_HTTP_RETRIES", "1");
    cmd.env("MCP_USAGE_LOG", usage_path);
    cmd.env("RUST_LOG", "warn");
    cmd.env_remove("PIXABAY_API_KEY");
    cmd.env_remove("GITHUB_TOKEN");

    let transport = TokioChildProcess::new(cmd).context("spawn mcp server")?;
    let service = tokio::time::timeout(STARTUP_TIMEOUT, ().serve(transport))
        .await
        .context("timeout starting MCP server")??;
    Ok(service)
}

/// Build call params via serde so the test stays agnostic to optional
/// fields on the params struct.
pub fn call_params(name: &str, arguments: serde_json::Value) -> CallToolRequestParams {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "arguments": arguments,
    }))
    .expect("valid tool-call params")
}

/// Extract the first text block of a tool result.
pub fn result_text(result: &rmcp::model::CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}
