//! The orchestrator: one dispatch path for every tool.
//!
//! Per invocation it (1) enforces the mandatory `reasoning` parameter,
//! (2) routes to the handler with an overall deadline, (3) converts any
//! failure into a human-readable body (nothing propagates to the
//! transport), (4) clamps the body to the configured budget, and
//! (5) appends exactly one usage event whose size field is the UTF-8
//! length of the final body.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use research_core::text::clamp_text;
use research_core::{ResearchError, Result};
use research_usage::TrackRequest;

use crate::catalog::TOOL_CATALOG;
use crate::state::AppState;

pub mod args;

mod api_docs_tool;
mod changelog_tool;
mod compare_tool;
mod crawl;
mod errors_tool;
mod extract_tool;
mod packages;
mod repo;
mod search_tools;
mod status_tool;

use args::Args;

/// Ceiling over any single invocation; individual upstream calls carry
/// tighter per-client deadlines.
const INVOCATION_DEADLINE: Duration = Duration::from_secs(90);

pub struct DispatchOutcome {
    pub body: String,
    pub success: bool,
}

/// Run one tool invocation end to end.
pub async fn dispatch(state: &Arc<AppState>, tool: &str, arguments: &Args) -> DispatchOutcome {
    let started = Instant::now();

    let reasoning = arguments
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let outcome: Result<String> = match &reasoning {
        None => Err(ResearchError::InputInvalid(format!(
            "Tool '{tool}' requires a non-empty 'reasoning' parameter explaining why it is being called"
        ))),
        Some(_) => run_handler(state, tool, arguments).await,
    };

    let (body, success, error_message) = match outcome {
        Ok(body) => {
            let clamped = clamp_text(&body, state.config.max_response_chars);
            (clamped, true, None)
        }
        Err(err) => {
            let message = failure_text(&err);
            let clamped = clamp_text(&message, state.config.max_response_chars);
            (clamped, false, Some(err.to_string()))
        }
    };

    // One call = one usage event, success or not.
    state
        .tracker
        .track(TrackRequest {
            tool: tool.to_string(),
            reasoning: reasoning.unwrap_or_default(),
            parameters: loggable_parameters(arguments),
            response_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            success,
            error_message,
            response_size_bytes: body.len() as u64,
        })
        .await;

    DispatchOutcome { body, success }
}

async fn run_handler(state: &Arc<AppState>, tool: &str, arguments: &Args) -> Result<String> {
    if !TOOL_CATALOG.iter().any(|t| t.name == tool) {
        return Err(ResearchError::InputInvalid(format!(
            "Unknown tool '{tool}'"
        )));
    }

    let handler = route(state, tool, arguments);
    match tokio::time::timeout(INVOCATION_DEADLINE, handler).await {
        Ok(result) => result,
        Err(_) => Err(ResearchError::UpstreamTimeout {
            upstream: format!("{tool} invocation"),
        }),
    }
}

async fn route(state: &Arc<AppState>, tool: &str, arguments: &Args) -> Result<String> {
    match tool {
        "web_search" => search_tools::web_search(state, arguments).await,
        "search_examples" => search_tools::search_examples(state, arguments).await,
        "search_images" => search_tools::search_images(state, arguments).await,
        "crawl_url" => crawl::crawl_url(state, arguments).await,
        "package_info" => packages::package_info(state, arguments).await,
        "package_search" => packages::package_search(state, arguments).await,
        "github_repo" => repo::github_repo(state, arguments).await,
        "translate_error" => errors_tool::translate_error(state, arguments).await,
        "api_docs" => api_docs_tool::api_docs(state, arguments).await,
        "extract_data" => extract_tool::extract_data(state, arguments).await,
        "compare_tech" => compare_tool::compare_tech(state, arguments).await,
        "get_changelog" => changelog_tool::get_changelog(state, arguments).await,
        "check_service_status" => status_tool::check_service_status(state, arguments).await,
        other => Err(ResearchError::InputInvalid(format!("Unknown tool '{other}'"))),
    }
}

/// Map the error taxonomy to user-facing text. Failures are replies, never
/// transport errors.
fn failure_text(err: &ResearchError) -> String {
    match err {
        ResearchError::InputInvalid(detail) => format!("Invalid input: {detail}"),
        ResearchError::NotFound(detail) => detail.clone(),
        ResearchError::UpstreamUnavailable { upstream, detail } => format!(
            "Sorry, {upstream} is currently unavailable ({detail}). Please try again later."
        ),
        ResearchError::UpstreamTimeout { upstream } => {
            format!("Sorry, {upstream} did not respond in time. Please try again later.")
        }
        ResearchError::UpstreamForbidden { upstream, status } => {
            format!("{upstream} refused the request (HTTP {status}).")
        }
        ResearchError::UpstreamMalformed { upstream, excerpt } => {
            format!("{upstream} returned unexpected data: {excerpt}")
        }
        ResearchError::RateLimited {
            upstream,
            retry_after_secs,
        } => match retry_after_secs {
            Some(secs) => {
                format!("{upstream} rate limited the request; retry after {secs}s.")
            }
            None => format!("{upstream} rate limited the request; try again later."),
        },
        ResearchError::Internal(detail) => format!("Internal error: {detail}"),
    }
}

/// Parameters as recorded in usage events; the reasoning field is tracked
/// separately and large blobs are elided.
fn loggable_parameters(arguments: &Args) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in arguments {
        if key == "reasoning" {
            continue;
        }
        let entry = match value {
            Value::String(s) if s.chars().count() > 200 => {
                Value::String(s.chars().take(200).collect())
            }
            other => other.clone(),
        };
        map.insert(key.clone(), entry);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_text_names_the_upstream() {
        let text = failure_text(&ResearchError::UpstreamUnavailable {
            upstream: "searxng".into(),
            detail: "connection refused".into(),
        });
        assert!(text.contains("searxng"));
        assert!(text.contains("unavailable"));
    }

    #[test]
    fn loggable_parameters_drop_reasoning_and_truncate() {
        let mut args = serde_json::Map::new();
        args.insert("reasoning".into(), Value::String("why".into()));
        args.insert("query".into(), Value::String("x".repeat(500)));
        let logged = loggable_parameters(&args);
        assert!(logged.get("reasoning").is_none());
        assert_eq!(
            logged["query"].as_str().unwrap().chars().count(),
            200
        );
    }
}
