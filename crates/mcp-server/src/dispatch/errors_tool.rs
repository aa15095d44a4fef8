//! Handler for `translate_error`.

use std::sync::Arc;

use research_core::{ResearchError, Result};
use research_pipelines::error_translate::{filter_and_rank_hits, Framework, Language};

use super::args::{int_in_range, opt_str, require_str, Args};
use crate::state::AppState;

pub async fn translate_error(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let error_message = require_str(args, "error_message")?;
    let language_hint = match opt_str(args, "language")? {
        Some(raw) => Some(Language::parse(&raw).ok_or_else(|| {
            ResearchError::InputInvalid(format!("Unknown language '{raw}'"))
        })?),
        None => None,
    };
    let framework_hint = match opt_str(args, "framework")? {
        Some(raw) => Some(Framework::parse(&raw).ok_or_else(|| {
            ResearchError::InputInvalid(format!("Unknown framework '{raw}'"))
        })?),
        None => None,
    };
    let max_results = int_in_range(args, "max_results", 1, 10, 5)? as usize;

    let parsed = state
        .error_parser
        .parse(&error_message, language_hint, framework_hint);
    let query = state.error_parser.build_search_query(&parsed);

    // Over-fetch so domain filtering still leaves a full page of results.
    let raw_hits = state
        .search
        .search(&query, "it", (max_results * 2).min(20), None)
        .await?;
    let hits = filter_and_rank_hits(raw_hits, max_results);

    let mut lines = vec!["## Error analysis".to_string()];
    lines.push(format!("Type: {}", parsed.error_type));
    lines.push(format!("Language: {}", parsed.language.as_str()));
    if let Some(framework) = parsed.framework {
        lines.push(format!("Framework: {}", framework.as_str()));
    }
    if let Some(file) = &parsed.file {
        match parsed.line {
            Some(line) => lines.push(format!("Location: {file}:{line}")),
            None => lines.push(format!("Location: {file}")),
        }
    }
    if !parsed.key_terms.is_empty() {
        lines.push(format!("Key terms: {}", parsed.key_terms.join(", ")));
    }
    lines.push(format!("Search query: {query}"));
    lines.push(String::new());

    if hits.is_empty() {
        lines.push("No matching solutions found.".to_string());
    } else {
        lines.push("## Possible solutions".to_string());
        for (idx, hit) in hits.iter().enumerate() {
            let snippet = if hit.snippet.is_empty() {
                String::new()
            } else {
                format!("\n{}", hit.snippet)
            };
            lines.push(format!("{}. {} - {}{snippet}", idx + 1, hit.title, hit.url));
        }
    }

    Ok(lines.join("\n"))
}
