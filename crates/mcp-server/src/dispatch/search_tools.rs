//! Handlers for the three search-shaped tools.

use std::sync::Arc;

use research_clients::SearchHit;
use research_core::Result;

use super::args::{enum_or, int_in_range, require_str, Args};
use crate::state::AppState;

const WEB_CATEGORIES: &[&str] = &["general", "it", "news", "science", "videos", "images", "files"];
const CONTENT_TYPES: &[&str] = &["code", "articles", "both"];
const TIME_RANGES: &[&str] = &["day", "week", "month", "year", "all"];
const IMAGE_TYPES: &[&str] = &["all", "photo", "illustration", "vector"];
const ORIENTATIONS: &[&str] = &["all", "horizontal", "vertical"];

pub async fn web_search(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let query = require_str(args, "query")?;
    let category = enum_or(args, "category", WEB_CATEGORIES, &state.config.default_category)?;
    let max_results = int_in_range(
        args,
        "max_results",
        1,
        10,
        state.config.default_max_results as i64,
    )? as usize;

    let hits = state.search.search(&query, &category, max_results, None).await?;
    if hits.is_empty() {
        return Ok(format!("No results for '{query}' in category '{category}'."));
    }
    Ok(format_hits(&hits, None))
}

pub async fn search_examples(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let query = require_str(args, "query")?;
    let content_type = enum_or(args, "content_type", CONTENT_TYPES, "both")?;
    let time_range = enum_or(args, "time_range", TIME_RANGES, "all")?;
    let max_results = int_in_range(
        args,
        "max_results",
        1,
        10,
        state.config.default_max_results as i64,
    )? as usize;

    let augmented = augment_examples_query(&query, &content_type);
    let time_range = (time_range != "all").then_some(time_range);
    let hits = state
        .search
        .search(&augmented, "it", max_results, time_range.as_deref())
        .await?;
    if hits.is_empty() {
        return Ok(format!("No example results for '{query}'."));
    }
    Ok(format_hits(&hits, Some(source_label)))
}

pub async fn search_images(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let query = require_str(args, "query")?;
    let image_type = enum_or(args, "image_type", IMAGE_TYPES, "all")?;
    let orientation = enum_or(args, "orientation", ORIENTATIONS, "all")?;
    let max_results = int_in_range(args, "max_results", 1, 20, 10)? as usize;

    if !state.images.is_configured() {
        return Ok(
            "Image search is not configured: set PIXABAY_API_KEY to enable Pixabay lookups. \
             Keys are free at https://pixabay.com/api/docs/."
                .to_string(),
        );
    }

    let images = state
        .images
        .search(&query, &image_type, &orientation, max_results)
        .await?;
    if images.is_empty() {
        return Ok(format!("No images found for '{query}'."));
    }

    let mut lines = Vec::with_capacity(images.len());
    for (idx, image) in images.iter().enumerate() {
        let mut block = format!(
            "{}. {}x{} by {} ({} views, {} downloads, {} likes)\n   preview: {}\n   large: {}",
            idx + 1,
            image.width,
            image.height,
            image.user,
            image.views,
            image.downloads,
            image.likes,
            image.preview_url,
            image.large_url,
        );
        if let Some(full_hd) = &image.full_hd_url {
            block.push_str(&format!("\n   full-hd: {full_hd}"));
        }
        if !image.tags.is_empty() {
            block.push_str(&format!("\n   tags: {}", image.tags.join(", ")));
        }
        lines.push(block);
    }
    Ok(lines.join("\n\n"))
}

/// Augment the raw query per content type: code searches are pinned to the
/// big example hosts, article searches get tutorial-flavored tokens.
fn augment_examples_query(query: &str, content_type: &str) -> String {
    match content_type {
        "code" => format!(
            "{query} site:github.com OR site:stackoverflow.com OR site:gist.github.com"
        ),
        "articles" => format!(
            "{query} tutorial OR guide OR article OR blog OR \"how to\" OR documentation"
        ),
        _ => query.to_string(),
    }
}

/// Source label derived from the hit's host.
fn source_label(hit: &SearchHit) -> &'static str {
    let host = url::Url::parse(&hit.url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()));
    match host.as_deref() {
        Some(h) if h.ends_with("github.com") => "[GitHub]",
        Some(h) if h.ends_with("stackoverflow.com") => "[Stack Overflow]",
        _ => "[Article]",
    }
}

fn format_hits(hits: &[SearchHit], label: Option<fn(&SearchHit) -> &'static str>) -> String {
    let mut blocks = Vec::with_capacity(hits.len());
    for (idx, hit) in hits.iter().enumerate() {
        let tag = label.map(|f| format!("{} ", f(hit))).unwrap_or_default();
        let engine = hit
            .engine
            .as_deref()
            .map(|e| format!(" (via {e})"))
            .unwrap_or_default();
        let snippet = if hit.snippet.is_empty() {
            String::new()
        } else {
            format!("\n{}", hit.snippet)
        };
        blocks.push(format!(
            "{}. {tag}{} - {}{engine}{snippet}",
            idx + 1,
            hit.title,
            hit.url
        ));
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: "Title".into(),
            url: url.into(),
            snippet: "snippet text".into(),
            engine: Some("brave".into()),
            score: None,
        }
    }

    #[test]
    fn code_mode_appends_site_restrictions() {
        let q = augment_examples_query("retry backoff", "code");
        for host in ["github.com", "stackoverflow.com", "gist.github.com"] {
            assert!(q.contains(host), "missing {host} in {q}");
        }
        assert!(q.starts_with("retry backoff"));
    }

    #[test]
    fn articles_mode_appends_tutorial_tokens() {
        let q = augment_examples_query("retry backoff", "articles");
        for token in ["tutorial", "guide", "article", "blog", "how to", "documentation"] {
            assert!(q.contains(token), "missing {token} in {q}");
        }
    }

    #[test]
    fn both_mode_leaves_query_untouched() {
        assert_eq!(augment_examples_query("q", "both"), "q");
    }

    #[test]
    fn source_labels_follow_the_host() {
        assert_eq!(source_label(&hit("https://github.com/a/b")), "[GitHub]");
        assert_eq!(
            source_label(&hit("https://gist.github.com/a/b")),
            "[GitHub]"
        );
        assert_eq!(
            source_label(&hit("https://stackoverflow.com/q/1")),
            "[Stack Overflow]"
        );
        assert_eq!(source_label(&hit("https://blog.example.com/x")), "[Article]");
    }

    #[test]
    fn hits_format_as_numbered_blocks() {
        let text = format_hits(&[hit("https://example.com/1"), hit("https://example.com/2")], None);
        assert!(text.starts_with("1. Title - https://example.com/1 (via brave)"));
        assert!(text.contains("\n\n2. "));
        assert!(text.contains("snippet text"));
    }
}
