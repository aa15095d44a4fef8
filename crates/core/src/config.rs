//! Environment-driven configuration, read once at startup and frozen.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default clamp applied to every tool reply, in characters.
pub const DEFAULT_MAX_RESPONSE_CHARS: usize = 8_000;
/// Default ceiling for crawled page bodies, in characters.
pub const DEFAULT_CRAWL_MAX_CHARS: usize = 8_000;
/// Hard ceiling for raw-HTML fetches, in characters.
pub const RAW_FETCH_MAX_CHARS: usize = 500_000;

const DEFAULT_SEARX_BASE_URL: &str = "http://localhost:2288/search";
const DEFAULT_CATEGORY: &str = "general";
const DEFAULT_MAX_RESULTS: usize = 5;
const DEFAULT_RESULT_CAP: usize = 10;
const DEFAULT_HTTP_RETRIES: u32 = 3;

/// Immutable process-wide settings.
///
/// Constructed exactly once in `main` and shared behind an `Arc`; no field is
/// ever mutated after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Meta-search endpoint (SearXNG `/search`).
    pub searx_base_url: String,
    /// Default category for `web_search`.
    pub default_category: String,
    /// Default `max_results` when the caller omits it.
    pub default_max_results: usize,
    /// Upper bound enforced on any `max_results` input.
    pub max_search_results: usize,
    /// Character ceiling for crawled markdown bodies.
    pub crawl_max_chars: usize,
    /// Orchestrator-level reply clamp, in characters.
    pub max_response_chars: usize,
    /// Override path for the usage log; `None` selects the config dir.
    pub usage_log_path: Option<PathBuf>,
    /// Pixabay API key; `search_images` degrades gracefully without it.
    pub pixabay_api_key: Option<String>,
    /// GitHub token; raises rate limits when present.
    pub github_token: Option<String>,
    /// Outgoing `User-Agent` header.
    pub user_agent: String,
    /// Retry attempts for search and fetch upstreams.
    pub http_retries: u32,
    /// Deadline for meta-search requests.
    pub search_timeout: Duration,
    /// Deadline for page fetches.
    pub fetch_timeout: Duration,
    /// Deadline for package-registry requests.
    pub registry_timeout: Duration,
    /// Deadline for repository-host requests.
    pub repo_timeout: Duration,
    /// Deadline for status-page requests.
    pub status_timeout: Duration,
}

impl Config {
    /// Read the configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            searx_base_url: env_str("SEARXNG_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SEARX_BASE_URL.to_string()),
            default_category: env_str("SEARXNG_DEFAULT_CATEGORY")
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            default_max_results: env_parse("SEARXNG_DEFAULT_RESULTS", DEFAULT_MAX_RESULTS),
            max_search_results: env_parse("SEARXNG_MAX_RESULTS", DEFAULT_RESULT_CAP).max(1),
            crawl_max_chars: env_parse("SEARXNG_CRAWL_MAX_CHARS", DEFAULT_CRAWL_MAX_CHARS).max(1),
            max_response_chars: env_parse("MCP_MAX_RESPONSE_CHARS", DEFAULT_MAX_RESPONSE_CHARS)
                .max(1),
            usage_log_path: env_str("MCP_USAGE_LOG").map(PathBuf::from),
            pixabay_api_key: env_str("PIXABAY_API_KEY"),
            github_token: env_str("GITHUB_TOKEN"),
            user_agent: env_str("SEARXNG_MCP_USER_AGENT").unwrap_or_else(default_user_agent),
            http_retries: env_parse("RESEARCH_HTTP_RETRIES", DEFAULT_HTTP_RETRIES).max(1),
            search_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(30),
            registry_timeout: Duration::from_secs(10),
            repo_timeout: Duration::from_secs(10),
            status_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_user_agent() -> String {
    format!("web-research-assistant/{}", env!("CARGO_PKG_VERSION"))
}

/// Trimmed, non-empty environment string.
pub fn env_str(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env_str(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable {key}={raw:?}");
            default
        }),
        None => default,
    }
}
