//! Page fetcher: renders a URL to readable markdown or raw HTML under a
//! character ceiling.
//!
//! A direct HTTP client stands in for a headless browser: redirects are
//! followed, each fetch carries the configured deadline, and the body is
//! never grown past the caller's ceiling. Every outcome is reported to the
//! domain health tracker.

use std::sync::Arc;
use std::time::Instant;

use scraper::{ElementRef, Html, Selector};

use research_core::text::{clamp_text, strip_control_chars};
use research_core::{Config, ResearchError, Result};

use crate::domain_health::DomainHealthTracker;
use crate::http;

/// Classified outcome of one fetch, as recorded for domain health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    /// 401/403: the host refused us.
    Blocked,
    /// 429.
    RateLimited,
    /// Transport failure or any other non-success status.
    Error,
}

impl FetchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Blocked => "blocked",
            Self::RateLimited => "rate_limited",
            Self::Error => "error",
        }
    }
}

#[derive(Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    retries: u32,
    health: Arc<DomainHealthTracker>,
}

impl Fetcher {
    pub fn new(config: &Config, health: Arc<DomainHealthTracker>) -> Self {
        Self {
            http: http::build_client(config, config.fetch_timeout),
            retries: config.http_retries,
            health,
        }
    }

    /// Fetch `url` and return a readable markdown rendering, at most
    /// `max_chars` characters.
    pub async fn fetch_markdown(&self, url: &str, max_chars: usize) -> Result<String> {
        let html = self.fetch_html(url).await?;
        let markdown = html_to_markdown(&html);
        if markdown.trim().is_empty() {
            return Err(ResearchError::UpstreamMalformed {
                upstream: "page fetch".into(),
                excerpt: format!("{url} yielded no readable content"),
            });
        }
        Ok(clamp_text(markdown.trim(), max_chars))
    }

    /// Fetch `url` and return the raw HTML, at most `max_chars` characters.
    pub async fn fetch_raw(&self, url: &str, max_chars: usize) -> Result<String> {
        let html = self.fetch_html(url).await?;
        Ok(clamp_text(html.trim(), max_chars))
    }

    /// HEAD `url` and report the status code, or `None` when unreachable.
    pub async fn head_status(&self, url: &str) -> Option<u16> {
        let response = self.http.head(url).send().await.ok()?;
        Some(response.status().as_u16())
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        http::with_retry(self.retries, || self.fetch_html_once(url)).await
    }

    async fn fetch_html_once(&self, url: &str) -> Result<String> {
        let domain = http::url_host(url).unwrap_or_else(|| "unknown".to_string());
        log::debug!("fetch {url}");
        let started = Instant::now();

        let outcome = self.http.get(url).send().await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.health.record(&domain, FetchStatus::Error, elapsed_ms);
                return Err(ResearchError::from_reqwest("page fetch", err));
            }
        };

        let status = response.status();
        let fetch_status = match status.as_u16() {
            200..=299 => FetchStatus::Ok,
            401 | 403 => FetchStatus::Blocked,
            429 => FetchStatus::RateLimited,
            _ => FetchStatus::Error,
        };
        self.health.record(&domain, fetch_status, elapsed_ms);

        match fetch_status {
            FetchStatus::Ok => {}
            FetchStatus::Blocked => {
                return Err(ResearchError::UpstreamForbidden {
                    upstream: "page fetch".into(),
                    status: status.as_u16(),
                })
            }
            FetchStatus::RateLimited => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(ResearchError::RateLimited {
                    upstream: "page fetch".into(),
                    retry_after_secs: retry_after,
                });
            }
            FetchStatus::Error => {
                return Err(ResearchError::UpstreamUnavailable {
                    upstream: "page fetch".into(),
                    detail: format!("HTTP {}", status.as_u16()),
                })
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResearchError::from_reqwest("page fetch", e))?;
        Ok(strip_control_chars(&body))
    }
}

// ============================================================================
// HTML → markdown rendering
// ============================================================================

/// Render an HTML document to plain markdown.
///
/// Block structure (headings, paragraphs, lists, code fences, quotes) is
/// preserved; navigation chrome and scripts are dropped.
pub fn html_to_markdown(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("static selector");

    let mut out = String::new();
    if let Some(body) = doc.select(&body_selector).next() {
        render_block(body, &mut out);
    } else {
        out.push_str(&element_inline_text(doc.root_element()));
    }

    collapse_blank_runs(&out)
}

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "iframe", "nav", "footer", "template",
];

fn render_block(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                push_paragraph(out, trimmed);
            }
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let tag = child_el.value().name();
        if SKIPPED_TAGS.contains(&tag) {
            continue;
        }
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = element_inline_text(child_el);
                if !text.is_empty() {
                    push_paragraph(out, &format!("{} {}", "#".repeat(level), text));
                }
            }
            "p" | "dt" | "dd" | "figcaption" | "caption" => {
                let text = element_inline_text(child_el);
                if !text.is_empty() {
                    push_paragraph(out, &text);
                }
            }
            "ul" | "ol" => {
                render_list(child_el, tag == "ol", out);
            }
            "pre" => {
                let code: String = child_el.text().collect();
                let code = code.trim_matches('\n');
                if !code.is_empty() {
                    push_paragraph(out, &format!("```\n{code}\n```"));
                }
            }
            "blockquote" => {
                let text = element_inline_text(child_el);
                if !text.is_empty() {
                    push_paragraph(out, &format!("> {text}"));
                }
            }
            "br" => out.push('\n'),
            _ => render_block(child_el, out),
        }
    }
}

fn render_list(el: ElementRef<'_>, ordered: bool, out: &mut String) {
    let mut index = 0usize;
    let mut items = Vec::new();
    for child in el.children() {
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        if child_el.value().name() != "li" {
            continue;
        }
        index += 1;
        let text = element_inline_text(child_el);
        if text.is_empty() {
            continue;
        }
        if ordered {
            items.push(format!("{index}. {text}"));
        } else {
            items.push(format!("- {text}"));
        }
    }
    if !items.is_empty() {
        push_paragraph(out, &items.join("\n"));
    }
}

/// Flatten an element to inline markdown: links become `[text](href)`,
/// inline code gets backticks, everything else is whitespace-normalized
/// text.
fn element_inline_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_inline(el, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_inline(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let tag = child_el.value().name();
        if SKIPPED_TAGS.contains(&tag) {
            continue;
        }
        match tag {
            "a" => {
                let label = {
                    let mut inner = String::new();
                    collect_inline(child_el, &mut inner);
                    inner.split_whitespace().collect::<Vec<_>>().join(" ")
                };
                match child_el.value().attr("href") {
                    Some(href) if !label.is_empty() && !href.starts_with('#') => {
                        out.push_str(&format!(" [{label}]({href}) "));
                    }
                    _ => out.push_str(&label),
                }
            }
            "code" => {
                let inner: String = child_el.text().collect();
                if !inner.trim().is_empty() {
                    out.push_str(&format!("`{}`", inner.trim()));
                }
            }
            "br" => out.push(' '),
            _ => collect_inline(child_el, out),
        }
    }
}

fn push_paragraph(out: &mut String, text: &str) {
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(text);
}

fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_streak = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_streak += 1;
            if blank_streak > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_streak = 0;
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_paragraphs_and_lists() {
        let html = r#"
            <html><body>
              <h1>Title</h1>
              <p>First <a href="https://example.com">link</a> paragraph.</p>
              <ul><li>alpha</li><li>beta</li></ul>
              <ol><li>one</li><li>two</li></ol>
              <script>ignored()</script>
            </body></html>
        "#;
        let md = html_to_markdown(html);
        assert!(md.starts_with("# Title"));
        assert!(md.contains("[link](https://example.com)"));
        assert!(md.contains("- alpha\n- beta"));
        assert!(md.contains("1. one\n2. two"));
        assert!(!md.contains("ignored"));
    }

    #[test]
    fn renders_code_fences() {
        let html = "<body><pre>fn main() {}\nlet x = 1;</pre></body>";
        let md = html_to_markdown(html);
        assert!(md.contains("```\nfn main() {}\nlet x = 1;\n```"));
    }

    #[test]
    fn inline_code_and_quotes() {
        let html = "<body><p>Use <code>cargo build</code></p><blockquote>Careful</blockquote></body>";
        let md = html_to_markdown(html);
        assert!(md.contains("`cargo build`"));
        assert!(md.contains("> Careful"));
    }

    #[test]
    fn empty_body_yields_empty_markdown() {
        assert_eq!(html_to_markdown("<body></body>"), "");
    }
}
