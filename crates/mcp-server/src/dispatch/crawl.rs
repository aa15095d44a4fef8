//! Handler for `crawl_url`.

use std::sync::Arc;

use research_core::{ResearchError, Result};

use super::args::{int_in_range, require_str, Args};
use crate::state::AppState;

pub async fn crawl_url(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let url = require_str(args, "url")?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ResearchError::InputInvalid(format!(
            "Parameter 'url' must be an http(s) URL (got '{url}')"
        )));
    }
    let max_chars = int_in_range(
        args,
        "max_chars",
        1,
        50_000,
        state.config.crawl_max_chars as i64,
    )? as usize;

    state.fetcher.fetch_markdown(&url, max_chars).await
}
