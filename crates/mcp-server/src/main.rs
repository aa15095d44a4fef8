//! Web Research Assistant MCP server.
//!
//! Speaks MCP over stdio. Exposes the research tool catalog (search, crawl,
//! package/repo intel, error translation, API docs, extraction, comparison,
//! changelogs, service status), four JSON resource templates, and five
//! prompt templates.
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "web-research": {
//!       "command": "web-research-mcp"
//!     }
//!   }
//! }
//! ```

use std::sync::Arc;

use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};

mod catalog;
mod dispatch;
mod prompts;
mod resources;
mod service;
mod state;

use research_core::Config;
use service::ResearchService;
use state::AppState;

fn print_help() {
    println!("Web Research Assistant MCP server");
    println!();
    println!("Usage: web-research-mcp [--print-tools|--version|--help]");
    println!();
    println!("Flags:");
    println!("  --print-tools  Print the tool inventory as JSON and exit");
    println!("  --version      Print version and exit");
    println!("  --help         Print this help and exit");
    println!();
    println!("Env:");
    println!("  SEARXNG_BASE_URL        Meta-search endpoint (default http://localhost:2288/search)");
    println!("  MCP_MAX_RESPONSE_CHARS  Reply clamp in characters (default 8000)");
    println!("  MCP_USAGE_LOG           Usage-log path override");
    println!("  PIXABAY_API_KEY         Enables search_images");
    println!("  GITHUB_TOKEN            Raises GitHub rate limits");
    println!("  RESEARCH_MCP_LOG=1      Enable stderr logging");
}

fn handle_cli_args() -> Option<i32> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return None;
    }

    match args[0].as_str() {
        // Compatibility: some MCP clients unconditionally pass `--stdio`.
        "--stdio" | "stdio" => None,
        "--print-tools" => {
            let payload = catalog::tool_inventory_json(env!("CARGO_PKG_VERSION"));
            println!("{payload}");
            Some(0)
        }
        "--version" | "-V" => {
            println!("web-research-mcp {}", env!("CARGO_PKG_VERSION"));
            Some(0)
        }
        "--help" | "-h" => {
            print_help();
            Some(0)
        }
        other => {
            // Be permissive: agent tooling can pass wrapper args. Starting
            // the server is better than failing the toolchain.
            if logging_enabled() {
                log::warn!("Ignoring unknown arguments starting at: {other}");
            }
            None
        }
    }
}

fn logging_enabled() -> bool {
    // Protocol purity: stdout carries MCP frames and some clients merge
    // stderr into stdout, so logging stays opt-in.
    research_core::config::env_str("RESEARCH_MCP_LOG")
        .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Some(code) = handle_cli_args() {
        std::process::exit(code);
    }

    if logging_enabled() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Stderr)
            .init();
        log::info!("Starting web-research-mcp");
    }

    let state = Arc::new(AppState::new(Config::from_env()));
    let service = ResearchService::new(Arc::clone(&state));

    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    if logging_enabled() {
        log::info!("{}", state.domain_health.format_report());
        log::info!("web-research-mcp stopped");
    }
    Ok(())
}
