//! Meta-search adapter for a local SearXNG instance.

use serde::Deserialize;

use research_core::text::clamp_text;
use research_core::{Config, ResearchError, Result};

use crate::http;

const MAX_SNIPPET_CHARS: usize = 300;

/// One ranked hit from the meta-search backend.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Upstream engine that produced the hit, when reported.
    pub engine: Option<String>,
    pub score: Option<f64>,
}

/// Issues `format=json` queries against the configured SearXNG endpoint and
/// returns hits in upstream ranking order.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
    result_cap: usize,
}

#[derive(Deserialize)]
struct SearxResponse {
    results: Option<Vec<SearxResult>>,
}

#[derive(Deserialize)]
struct SearxResult {
    title: Option<String>,
    pretty_url: Option<String>,
    url: Option<String>,
    content: Option<String>,
    snippet: Option<String>,
    engine: Option<String>,
    score: Option<f64>,
}

impl SearchClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http::build_client(config, config.search_timeout),
            base_url: config.searx_base_url.clone(),
            retries: config.http_retries,
            result_cap: config.max_search_results,
        }
    }

    /// Return up to `max_results` hits for `query` within `category`.
    ///
    /// `time_range` is one of day/week/month/year; `None` means unbounded.
    /// Connect failures and timeouts are retried with backoff before
    /// surfacing as `UPSTREAM_UNAVAILABLE` / `UPSTREAM_TIMEOUT`.
    pub async fn search(
        &self,
        query: &str,
        category: &str,
        max_results: usize,
        time_range: Option<&str>,
    ) -> Result<Vec<SearchHit>> {
        let limit = max_results.clamp(1, self.result_cap);

        http::with_retry(self.retries, || self.search_once(query, category, limit, time_range))
            .await
    }

    async fn search_once(
        &self,
        query: &str,
        category: &str,
        limit: usize,
        time_range: Option<&str>,
    ) -> Result<Vec<SearchHit>> {
        let mut params = vec![
            ("q", query.to_string()),
            ("categories", category.to_string()),
            ("format", "json".to_string()),
            ("pageno", "1".to_string()),
        ];
        if let Some(range) = time_range.filter(|r| *r != "all") {
            params.push(("time_range", range.to_string()));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ResearchError::from_reqwest("searxng", e))?
            .error_for_status()
            .map_err(|e| ResearchError::from_reqwest("searxng", e))?;

        let payload: SearxResponse = response
            .json()
            .await
            .map_err(|_| ResearchError::UpstreamMalformed {
                upstream: "searxng".into(),
                excerpt: "response was not JSON".into(),
            })?;

        let Some(results) = payload.results else {
            return Err(ResearchError::UpstreamMalformed {
                upstream: "searxng".into(),
                excerpt: "missing 'results' array".into(),
            });
        };

        Ok(results.into_iter().take(limit).map(into_hit).collect())
    }
}

fn into_hit(item: SearxResult) -> SearchHit {
    let url = item.url.unwrap_or_default();
    let title = item
        .title
        .filter(|t| !t.trim().is_empty())
        .or(item.pretty_url)
        .unwrap_or_else(|| {
            if url.is_empty() {
                "Untitled".to_string()
            } else {
                url.clone()
            }
        })
        .trim()
        .to_string();
    let snippet = item
        .content
        .or(item.snippet)
        .map(|s| clamp_text(s.trim(), MAX_SNIPPET_CHARS))
        .unwrap_or_default();
    SearchHit {
        title,
        url,
        snippet,
        engine: item.engine,
        score: item.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_falls_back_through_title_sources() {
        let item = SearxResult {
            title: Some("  ".into()),
            pretty_url: Some("example.com/page".into()),
            url: Some("https://example.com/page".into()),
            content: None,
            snippet: Some("a snippet".into()),
            engine: Some("duckduckgo".into()),
            score: None,
        };
        let hit = into_hit(item);
        assert_eq!(hit.title, "example.com/page");
        assert_eq!(hit.snippet, "a snippet");
        assert_eq!(hit.engine.as_deref(), Some("duckduckgo"));
    }
}
