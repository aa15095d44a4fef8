//! Handler for `extract_data`.

use std::sync::Arc;

use research_core::config::RAW_FETCH_MAX_CHARS;
use research_core::{ResearchError, Result};
use research_pipelines::ExtractKind;

use super::args::{enum_or, int_in_range, opt_str_map, require_str, Args};
use crate::state::AppState;

const EXTRACT_TYPES: &[&str] = &["table", "list", "fields", "json-ld", "auto"];

pub async fn extract_data(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let url = require_str(args, "url")?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ResearchError::InputInvalid(format!(
            "Parameter 'url' must be an http(s) URL (got '{url}')"
        )));
    }
    let extract_type = enum_or(args, "extract_type", EXTRACT_TYPES, "auto")?;
    let kind = ExtractKind::parse(&extract_type).ok_or_else(|| {
        ResearchError::InputInvalid(format!("Unknown extract_type '{extract_type}'"))
    })?;
    let selectors = opt_str_map(args, "selectors")?;
    let max_items = int_in_range(args, "max_items", 1, 500, 100)? as usize;

    // Fields mode needs its selectors validated before we spend a fetch.
    if kind == ExtractKind::Fields && selectors.as_ref().is_none_or(|s| s.is_empty()) {
        return Err(ResearchError::InputInvalid(
            "extract_type 'fields' requires a non-empty 'selectors' map".into(),
        ));
    }

    let html = state.fetcher.fetch_raw(&url, RAW_FETCH_MAX_CHARS).await?;
    let result = state
        .extractor
        .extract(&html, kind, selectors.as_ref(), max_items)?;

    serde_json::to_string_pretty(&result)
        .map_err(|e| ResearchError::Internal(format!("failed to serialize extraction: {e}")))
}
