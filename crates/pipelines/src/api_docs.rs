//! API documentation discovery and topic extraction.
//!
//! Base-URL resolution is three-stage: curated known-URL table, then a
//! candidate-pattern HEAD probe (`.com` preferred over `.io` when several
//! answer), then a meta-search fallback filtered to documentation-looking
//! URLs. Topic pages are found with a site-restricted search, crawled
//! concurrently, and mined for overview text, parameter triples, code
//! examples, admonition notes, and related links.

use futures::future::join_all;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use research_clients::{Fetcher, SearchClient};
use research_core::text::sanitize;
use research_core::{ResearchError, Result};

const OVERVIEW_MIN_CHARS: usize = 80;
const MAX_PARAMETERS: usize = 30;
const MAX_EXAMPLES: usize = 8;
const MAX_NOTES: usize = 6;
const MAX_RELATED_LINKS: usize = 10;
const PAGE_FETCH_MAX_CHARS: usize = 120_000;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiParameter {
    pub name: String,
    pub param_type: String,
    pub description: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiExample {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiDoc {
    pub api_name: String,
    pub topic: String,
    pub docs_base_url: Option<String>,
    pub overview: Option<String>,
    pub parameters: Vec<ApiParameter>,
    pub examples: Vec<ApiExample>,
    pub notes: Vec<String>,
    pub related_links: Vec<RelatedLink>,
    pub sources: Vec<String>,
}

pub struct DocDiscoverer {
    search: SearchClient,
    fetcher: Fetcher,
    param_line: Regex,
}

impl DocDiscoverer {
    pub fn new(search: SearchClient, fetcher: Fetcher) -> Self {
        Self {
            search,
            fetcher,
            param_line: Regex::new(
                r"(?i)^`?([A-Za-z_][\w.\[\]]*)`?\s*[(\[]?\s*(string|integer|int|boolean|bool|number|float|array|object|enum|uuid|timestamp)\s*[)\]]?\s*[-:]?\s*(.*)$",
            )
            .expect("static regex"),
        }
    }

    /// Resolve the documentation base URL for `api_name`.
    pub async fn discover_docs_url(&self, api_name: &str) -> Result<String> {
        let key = normalize_api_name(api_name);
        if let Some(url) = KNOWN_DOCS_URLS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, url)| url)
        {
            return Ok((*url).to_string());
        }

        // Probe every candidate pattern concurrently; among the 2xx
        // responders, .com hosts win over .io.
        let candidates = candidate_doc_urls(&key);
        let probes = join_all(candidates.iter().map(|url| self.fetcher.head_status(url))).await;
        let mut responders: Vec<&String> = candidates
            .iter()
            .zip(probes)
            .filter(|(_, status)| status.is_some_and(|code| (200..300).contains(&code)))
            .map(|(url, _)| url)
            .collect();
        responders.sort_by_key(|url| if url.contains(".com") { 0 } else { 1 });
        if let Some(url) = responders.first() {
            return Ok((*url).clone());
        }

        // Meta-search fallback.
        let hits = self
            .search
            .search(
                &format!("{api_name} API official documentation"),
                "it",
                5,
                None,
            )
            .await?;
        hits.into_iter()
            .find(|hit| {
                let lowered = hit.url.to_lowercase();
                lowered.contains("docs") || lowered.contains("developer") || lowered.contains("api")
            })
            .map(|hit| hit.url)
            .ok_or_else(|| {
                ResearchError::NotFound(format!(
                    "Could not find official documentation for '{api_name}'"
                ))
            })
    }

    /// Full pipeline: discover the docs site, search it for `topic`, crawl
    /// the best pages, and extract structured content.
    pub async fn get_api_docs(
        &self,
        api_name: &str,
        topic: &str,
        max_results: usize,
    ) -> Result<ApiDoc> {
        let base_url = self.discover_docs_url(api_name).await?;
        let docs_host = host_of(&base_url);

        let mut page_urls: Vec<String> = Vec::new();
        if let Some(host) = &docs_host {
            let hits = self
                .search
                .search(&format!("site:{host} {topic}"), "it", max_results, None)
                .await
                .unwrap_or_default();
            page_urls.extend(hits.into_iter().map(|h| h.url));
        }
        if page_urls.is_empty() {
            // No site-search coverage: fall back to the landing page itself.
            page_urls.push(base_url.clone());
        }
        page_urls.truncate(max_results.max(1));

        let pages = join_all(
            page_urls
                .iter()
                .map(|url| self.fetcher.fetch_raw(url, PAGE_FETCH_MAX_CHARS)),
        )
        .await;

        let mut doc = ApiDoc {
            api_name: api_name.to_string(),
            topic: topic.to_string(),
            docs_base_url: Some(base_url),
            overview: None,
            parameters: Vec::new(),
            examples: Vec::new(),
            notes: Vec::new(),
            related_links: Vec::new(),
            sources: Vec::new(),
        };

        for (url, outcome) in page_urls.iter().zip(pages) {
            let Ok(html) = outcome else {
                continue;
            };
            doc.sources.push(url.clone());
            self.extract_page(&html, url, docs_host.as_deref(), &mut doc);
        }

        if doc.sources.is_empty() {
            return Err(ResearchError::UpstreamUnavailable {
                upstream: format!("{api_name} documentation"),
                detail: "no documentation page could be fetched".into(),
            });
        }

        doc.parameters.truncate(MAX_PARAMETERS);
        doc.examples.truncate(MAX_EXAMPLES);
        doc.notes.truncate(MAX_NOTES);
        doc.related_links.truncate(MAX_RELATED_LINKS);
        Ok(doc)
    }

    fn extract_page(&self, html: &str, page_url: &str, docs_host: Option<&str>, doc: &mut ApiDoc) {
        let parsed = Html::parse_document(html);

        if doc.overview.is_none() {
            doc.overview = extract_overview(&parsed);
        }
        self.extract_parameters(&parsed, &mut doc.parameters);
        extract_examples(&parsed, &mut doc.examples);
        extract_notes(&parsed, &mut doc.notes);
        extract_related_links(&parsed, page_url, docs_host, &mut doc.related_links);
    }

    /// Parameters come from definition-style tables first, then from
    /// `name (type): description` lines in list items.
    fn extract_parameters(&self, doc: &Html, out: &mut Vec<ApiParameter>) {
        let table_sel = Selector::parse("table").expect("static selector");
        let th_sel = Selector::parse("th").expect("static selector");
        let tr_sel = Selector::parse("tr").expect("static selector");
        let td_sel = Selector::parse("td").expect("static selector");

        for table in doc.select(&table_sel) {
            let headers: Vec<String> = table
                .select(&th_sel)
                .map(|th| sanitize(&th.text().collect::<String>()).to_lowercase())
                .collect();
            let name_idx = headers
                .iter()
                .position(|h| h.contains("name") || h.contains("parameter") || h.contains("field"));
            let type_idx = headers.iter().position(|h| h.contains("type"));
            let desc_idx = headers.iter().position(|h| h.contains("desc"));
            let (Some(name_idx), Some(desc_idx)) = (name_idx, desc_idx) else {
                continue;
            };

            for row in table.select(&tr_sel) {
                if out.len() >= MAX_PARAMETERS {
                    return;
                }
                let cells: Vec<String> = row
                    .select(&td_sel)
                    .map(|td| sanitize(&td.text().collect::<String>()))
                    .collect();
                if cells.len() <= name_idx.max(desc_idx) {
                    continue;
                }
                let name = cells[name_idx].clone();
                if name.is_empty() {
                    continue;
                }
                out.push(ApiParameter {
                    name,
                    param_type: type_idx
                        .and_then(|i| cells.get(i))
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string()),
                    description: cells[desc_idx].clone(),
                });
            }
        }

        let li_sel = Selector::parse("li, dt, p").expect("static selector");
        for el in doc.select(&li_sel) {
            if out.len() >= MAX_PARAMETERS {
                return;
            }
            let text = sanitize(&el.text().collect::<String>());
            if let Some(caps) = self.param_line.captures(&text) {
                let name = caps[1].to_string();
                if out.iter().any(|p| p.name == name) {
                    continue;
                }
                out.push(ApiParameter {
                    name,
                    param_type: caps[2].to_lowercase(),
                    description: caps[3].trim().to_string(),
                });
            }
        }
    }
}

fn extract_overview(doc: &Html) -> Option<String> {
    for scope in ["main p", "article p", "p"] {
        let Ok(selector) = Selector::parse(scope) else {
            continue;
        };
        for p in doc.select(&selector) {
            let text = sanitize(&p.text().collect::<String>());
            if text.chars().count() >= OVERVIEW_MIN_CHARS {
                return Some(text);
            }
        }
    }
    None
}

fn extract_examples(doc: &Html, out: &mut Vec<ApiExample>) {
    let pre_code_sel = Selector::parse("pre code, pre").expect("static selector");
    for el in doc.select(&pre_code_sel) {
        if out.len() >= MAX_EXAMPLES {
            return;
        }
        let code: String = el.text().collect();
        let code = code.trim();
        if code.len() < 10 {
            continue;
        }
        if out.iter().any(|e| e.code == code) {
            continue;
        }
        let language = el
            .value()
            .attr("class")
            .and_then(|classes| {
                classes
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
            })
            .unwrap_or("text")
            .to_string();
        out.push(ApiExample {
            language,
            code: code.to_string(),
        });
    }
}

fn extract_notes(doc: &Html, out: &mut Vec<String>) {
    const NOTE_SELECTORS: &[&str] = &[
        "[class*=warning]",
        "[class*=caution]",
        "[class*=note]",
        "[class*=tip]",
        "[class*=admonition]",
        "[class*=callout]",
    ];
    for css in NOTE_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for el in doc.select(&selector) {
            if out.len() >= MAX_NOTES {
                return;
            }
            let text = sanitize(&el.text().collect::<String>());
            if text.chars().count() < 15 || text.chars().count() > 500 {
                continue;
            }
            if !out.contains(&text) {
                out.push(text);
            }
        }
    }
}

/// In-page anchors to other pages on the docs host; relative links are
/// resolved against the page URL.
fn extract_related_links(
    doc: &Html,
    page_url: &str,
    docs_host: Option<&str>,
    out: &mut Vec<RelatedLink>,
) {
    let Ok(base) = Url::parse(page_url) else {
        return;
    };
    let a_sel = Selector::parse("a[href]").expect("static selector");
    for a in doc.select(&a_sel) {
        if out.len() >= MAX_RELATED_LINKS {
            return;
        }
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:") {
            continue;
        }
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let same_host = match (docs_host, resolved.host_str()) {
            (Some(expected), Some(actual)) => {
                actual.trim_start_matches("www.") == expected.trim_start_matches("www.")
            }
            _ => false,
        };
        if !same_host || resolved.as_str() == page_url {
            continue;
        }
        let title = sanitize(&a.text().collect::<String>());
        if title.chars().count() < 3 {
            continue;
        }
        let url = resolved.to_string();
        if out.iter().any(|l| l.url == url) {
            continue;
        }
        out.push(RelatedLink { title, url });
    }
}

fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.trim_start_matches("www.").to_string())
}

fn normalize_api_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn candidate_doc_urls(name: &str) -> Vec<String> {
    vec![
        format!("https://docs.{name}.com"),
        format!("https://{name}.com/docs"),
        format!("https://{name}.com/docs/api"),
        format!("https://developers.{name}.com"),
        format!("https://developer.{name}.com"),
        format!("https://{name}.dev"),
        format!("https://docs.{name}.io"),
        format!("https://{name}.io/docs"),
        format!("https://{name}.readthedocs.io"),
    ]
}

/// Curated documentation URLs for names that pattern probing gets wrong or
/// that are popular enough to deserve a short-circuit.
const KNOWN_DOCS_URLS: &[(&str, &str)] = &[
    ("stripe", "https://docs.stripe.com"),
    ("openai", "https://platform.openai.com/docs"),
    ("anthropic", "https://docs.anthropic.com"),
    ("claude", "https://docs.anthropic.com"),
    ("github", "https://docs.github.com"),
    ("gitlab", "https://docs.gitlab.com"),
    ("twilio", "https://www.twilio.com/docs"),
    ("sendgrid", "https://docs.sendgrid.com"),
    ("slack", "https://api.slack.com/docs"),
    ("discord", "https://discord.com/developers/docs"),
    ("telegram", "https://core.telegram.org/api"),
    ("aws", "https://docs.aws.amazon.com"),
    ("gcp", "https://cloud.google.com/docs"),
    ("googlecloud", "https://cloud.google.com/docs"),
    ("azure", "https://learn.microsoft.com/azure"),
    ("firebase", "https://firebase.google.com/docs"),
    ("supabase", "https://supabase.com/docs"),
    ("mongodb", "https://www.mongodb.com/docs"),
    ("postgresql", "https://www.postgresql.org/docs"),
    ("postgres", "https://www.postgresql.org/docs"),
    ("mysql", "https://dev.mysql.com/doc"),
    ("redis", "https://redis.io/docs"),
    ("elasticsearch", "https://www.elastic.co/docs"),
    ("docker", "https://docs.docker.com"),
    ("kubernetes", "https://kubernetes.io/docs"),
    ("terraform", "https://developer.hashicorp.com/terraform/docs"),
    ("react", "https://react.dev"),
    ("vue", "https://vuejs.org/guide"),
    ("angular", "https://angular.dev"),
    ("svelte", "https://svelte.dev/docs"),
    ("nextjs", "https://nextjs.org/docs"),
    ("nuxt", "https://nuxt.com/docs"),
    ("django", "https://docs.djangoproject.com"),
    ("flask", "https://flask.palletsprojects.com"),
    ("fastapi", "https://fastapi.tiangolo.com"),
    ("express", "https://expressjs.com"),
    ("rails", "https://guides.rubyonrails.org"),
    ("laravel", "https://laravel.com/docs"),
    ("spring", "https://docs.spring.io"),
    ("rust", "https://doc.rust-lang.org"),
    ("python", "https://docs.python.org"),
    ("node", "https://nodejs.org/docs"),
    ("nodejs", "https://nodejs.org/docs"),
    ("typescript", "https://www.typescriptlang.org/docs"),
    ("go", "https://go.dev/doc"),
    ("golang", "https://go.dev/doc"),
    ("cloudflare", "https://developers.cloudflare.com"),
    ("vercel", "https://vercel.com/docs"),
    ("netlify", "https://docs.netlify.com"),
    ("heroku", "https://devcenter.heroku.com"),
    ("auth0", "https://auth0.com/docs"),
    ("okta", "https://developer.okta.com/docs"),
    ("pixabay", "https://pixabay.com/api/docs"),
    ("huggingface", "https://huggingface.co/docs"),
    ("pytorch", "https://pytorch.org/docs"),
    ("tensorflow", "https://www.tensorflow.org/api_docs"),
    ("kafka", "https://kafka.apache.org/documentation"),
    ("rabbitmq", "https://www.rabbitmq.com/docs"),
    ("graphql", "https://graphql.org/learn"),
    ("openapi", "https://spec.openapis.org"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_short_circuit() {
        assert!(KNOWN_DOCS_URLS.iter().any(|(n, _)| *n == "stripe"));
        assert_eq!(normalize_api_name("Google Cloud"), "googlecloud");
        assert_eq!(normalize_api_name("next.js"), "nextjs");
    }

    #[test]
    fn candidates_cover_com_and_io() {
        let candidates = candidate_doc_urls("acme");
        assert!(candidates.contains(&"https://docs.acme.com".to_string()));
        assert!(candidates.contains(&"https://acme.com/docs".to_string()));
        assert!(candidates.contains(&"https://docs.acme.io".to_string()));
        // .com candidates sort before .io when both respond.
        let mut responders = vec![
            "https://docs.acme.io".to_string(),
            "https://docs.acme.com".to_string(),
        ];
        responders.sort_by_key(|url| if url.contains(".com") { 0 } else { 1 });
        assert_eq!(responders[0], "https://docs.acme.com");
    }

    #[test]
    fn overview_skips_short_paragraphs() {
        let html = Html::parse_document(
            "<body><p>Short.</p><p>This paragraph is long enough to serve as an overview \
             because it comfortably exceeds the minimum character threshold.</p></body>",
        );
        let overview = extract_overview(&html).unwrap();
        assert!(overview.starts_with("This paragraph"));
    }

    #[test]
    fn examples_capture_language_tags() {
        let html = Html::parse_document(
            r#"<body><pre><code class="language-python">import requests; r = requests.get(url)</code></pre></body>"#,
        );
        let mut out = Vec::new();
        extract_examples(&html, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].language, "python");
    }

    #[test]
    fn parameter_tables_are_mined() {
        let discoverer_regex = Regex::new(
            r"(?i)^`?([A-Za-z_][\w.\[\]]*)`?\s*[(\[]?\s*(string|integer|int|boolean|bool|number|float|array|object|enum|uuid|timestamp)\s*[)\]]?\s*[-:]?\s*(.*)$",
        )
        .unwrap();
        assert!(discoverer_regex.is_match("amount (integer): the amount in cents"));
        assert!(discoverer_regex.is_match("`currency` string - three-letter ISO code"));
        assert!(!discoverer_regex.is_match("Just a sentence about nothing"));
    }

    #[test]
    fn related_links_resolve_relative_hrefs() {
        let html = Html::parse_document(
            r##"<body>
                <a href="/docs/webhooks">Webhooks guide</a>
                <a href="https://elsewhere.example/x">Offsite</a>
                <a href="#anchor">Anchor</a>
            </body>"##,
        );
        let mut out = Vec::new();
        extract_related_links(
            &html,
            "https://docs.stripe.com/docs/payments",
            Some("docs.stripe.com"),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://docs.stripe.com/docs/webhooks");
        assert_eq!(out[0].title, "Webhooks guide");
    }
}
