//! Service status-page discovery and parsing.
//!
//! Resolution order: curated known-pages table (after alias normalization),
//! then a small pattern enumeration probed with HEAD. Parsing order: the
//! Atlassian Statuspage JSON API, then HTML heuristics, then a bare
//! HEAD reachability check. Coverage is best-effort by design; `unknown`
//! is a normal answer for services with bespoke status pages.

use chrono::{Duration as ChronoDuration, Utc};
use scraper::{Html, Selector};
use serde::Deserialize;

use research_core::{Config, ResearchError, Result};

use crate::http;

const MAX_COMPONENTS: usize = 10;
const MAX_INCIDENTS: usize = 3;
const HTML_FETCH_MAX_BYTES: usize = 200_000;

/// Closed set of normalized service states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Operational,
    DegradedPerformance,
    PartialOutage,
    MajorOutage,
    UnderMaintenance,
    Unknown,
}

impl ServiceState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::DegradedPerformance => "degraded_performance",
            Self::PartialOutage => "partial_outage",
            Self::MajorOutage => "major_outage",
            Self::UnderMaintenance => "under_maintenance",
            Self::Unknown => "unknown",
        }
    }

    /// Emoji rendering is a pure function of the state.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Operational => "✅",
            Self::DegradedPerformance | Self::PartialOutage => "⚠️",
            Self::MajorOutage => "🚨",
            Self::UnderMaintenance => "🔧",
            Self::Unknown => "❓",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceIncident {
    pub title: String,
    /// investigating / identified / monitoring / resolved, when reported.
    pub status: Option<String>,
    pub started_at: Option<String>,
    pub resolved_at: Option<String>,
    /// minor / major / critical, when reported.
    pub impact: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceComponent {
    pub name: String,
    pub status: ServiceState,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub status: ServiceState,
    pub status_page_url: Option<String>,
    /// UTC ISO timestamp of this check.
    pub checked_at: String,
    pub current_incidents: Vec<ServiceIncident>,
    pub components: Vec<ServiceComponent>,
    pub recent_incidents: Option<Vec<ServiceIncident>>,
    pub uptime_percentage: Option<f64>,
    /// Extra context, e.g. "page requires JavaScript".
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct StatusClient {
    http: reqwest::Client,
}

impl StatusClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http::build_client(config, config.status_timeout),
        }
    }

    /// Resolve the status page for `service` without fetching it.
    pub fn find_status_page(service: &str) -> Option<String> {
        let normalized = normalize_service_name(service);
        if let Some(url) = known_status_page(&normalized) {
            return Some(url.to_string());
        }
        // Also try the raw cleaned name without alias resolution.
        let raw_cleaned = clean_service_name(service);
        known_status_page(&raw_cleaned).map(|url| url.to_string())
    }

    /// Candidate URLs tried when the curated table has no entry.
    pub fn candidate_urls(service: &str) -> Vec<String> {
        let s = normalize_service_name(service);
        vec![
            format!("https://status.{s}.com"),
            format!("https://{s}.statuspage.io"),
            format!("https://{s}.com/status"),
            format!("https://status.{s}.io"),
            format!("https://health.{s}.com"),
        ]
    }

    /// Check a service end to end.
    pub async fn check_service(
        &self,
        service: &str,
        include_history: bool,
        history_days: i64,
    ) -> Result<ServiceStatus> {
        let page_url = match Self::find_status_page(service) {
            Some(url) => url,
            None => match self.probe_candidates(service).await {
                Some(url) => url,
                None => {
                    return Err(ResearchError::NotFound(format!(
                        "Could not find a status page for '{service}'. Try checking {service}.com/status or searching for '{service} status page'."
                    )))
                }
            },
        };

        // Strategy 1: Statuspage JSON API.
        if let Some(mut status) = self.try_statuspage_api(service, &page_url).await {
            if include_history {
                status.recent_incidents = self.statuspage_history(&page_url, history_days).await;
            }
            return Ok(status);
        }

        // Strategy 2: HTML heuristics.
        if let Ok(html) = self.fetch_page(&page_url).await {
            if html.trim().len() > 100 {
                let mut status = parse_status_html(&html, service);
                status.status_page_url = Some(page_url);
                return Ok(status);
            }
        }

        // Strategy 3: reachability only.
        match self.head_status(&page_url).await {
            Some(code) if code < 400 => Ok(ServiceStatus {
                service: service.to_string(),
                status: ServiceState::Unknown,
                status_page_url: Some(page_url.clone()),
                checked_at: now_iso(),
                current_incidents: Vec::new(),
                components: Vec::new(),
                recent_incidents: None,
                uptime_percentage: None,
                note: Some(format!(
                    "Status page is accessible but requires JavaScript to render. Visit {page_url} to see current status."
                )),
            }),
            Some(code) => Err(ResearchError::UpstreamUnavailable {
                upstream: format!("{service} status page"),
                detail: format!("HTTP {code}"),
            }),
            None => Err(ResearchError::UpstreamUnavailable {
                upstream: format!("{service} status page"),
                detail: "unreachable".into(),
            }),
        }
    }

    async fn probe_candidates(&self, service: &str) -> Option<String> {
        for candidate in Self::candidate_urls(service) {
            if let Some(code) = self.head_status(&candidate).await {
                if code < 400 {
                    return Some(candidate);
                }
            }
        }
        None
    }

    async fn head_status(&self, url: &str) -> Option<u16> {
        let response = self.http.head(url).send().await.ok()?;
        Some(response.status().as_u16())
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ResearchError::from_reqwest("status page", e))?
            .error_for_status()
            .map_err(|e| ResearchError::from_reqwest("status page", e))?;
        let body = response
            .text()
            .await
            .map_err(|e| ResearchError::from_reqwest("status page", e))?;
        Ok(body.chars().take(HTML_FETCH_MAX_BYTES).collect())
    }

    // ------------------------------------------------------------------
    // Statuspage JSON API
    // ------------------------------------------------------------------

    async fn try_statuspage_api(&self, service: &str, page_url: &str) -> Option<ServiceStatus> {
        let base = page_url.trim_end_matches('/');

        let summary: StatuspageStatusDoc = {
            let status_doc = self.get_json(&format!("{base}/api/v2/status.json")).await;
            match status_doc {
                Some(doc) => doc,
                None => self.get_json(&format!("{base}/api/v2/summary.json")).await?,
            }
        };

        let indicator = summary.status.as_ref().map(|s| s.indicator.as_str());
        let status = match indicator {
            Some("none") => ServiceState::Operational,
            Some("minor") => ServiceState::DegradedPerformance,
            Some("major") => ServiceState::PartialOutage,
            Some("critical") => ServiceState::MajorOutage,
            Some("maintenance") => ServiceState::UnderMaintenance,
            _ => ServiceState::Unknown,
        };

        let mut current_incidents = self
            .statuspage_incidents(&format!("{base}/api/v2/incidents/unresolved.json"))
            .await
            .unwrap_or_default();
        current_incidents.truncate(MAX_INCIDENTS);

        let components = self
            .statuspage_components(&format!("{base}/api/v2/components.json"))
            .await
            .unwrap_or_default();

        Some(ServiceStatus {
            service: service.to_string(),
            status,
            status_page_url: Some(page_url.to_string()),
            checked_at: now_iso(),
            current_incidents,
            components,
            recent_incidents: None,
            uptime_percentage: None,
            note: None,
        })
    }

    async fn statuspage_incidents(&self, url: &str) -> Option<Vec<ServiceIncident>> {
        let doc: StatuspageIncidentsDoc = self.get_json(url).await?;
        Some(doc.incidents.into_iter().map(into_incident).collect())
    }

    async fn statuspage_components(&self, url: &str) -> Option<Vec<ServiceComponent>> {
        let doc: StatuspageComponentsDoc = self.get_json(url).await?;
        Some(
            doc.components
                .into_iter()
                .take(MAX_COMPONENTS)
                .map(|c| ServiceComponent {
                    status: normalize_status(&c.status),
                    name: c.name,
                })
                .collect(),
        )
    }

    async fn statuspage_history(&self, page_url: &str, days: i64) -> Option<Vec<ServiceIncident>> {
        let base = page_url.trim_end_matches('/');
        let doc: StatuspageIncidentsDoc = self
            .get_json(&format!("{base}/api/v2/incidents.json"))
            .await?;
        let cutoff = Utc::now() - ChronoDuration::days(days.max(1));
        let incidents = doc
            .incidents
            .into_iter()
            .filter(|incident| {
                incident
                    .created_at
                    .as_deref()
                    .and_then(research_core::timefmt::parse_iso)
                    .is_some_and(|at| at >= cutoff)
            })
            .map(into_incident)
            .take(MAX_INCIDENTS * 2)
            .collect();
        Some(incidents)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = self.http.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }
}

fn into_incident(raw: StatuspageIncident) -> ServiceIncident {
    let summary = raw
        .incident_updates
        .first()
        .map(|u| u.body.clone())
        .filter(|b| !b.is_empty());
    ServiceIncident {
        title: raw.name,
        status: raw.status,
        started_at: raw.started_at.or(raw.created_at),
        resolved_at: raw.resolved_at,
        impact: raw.impact,
        summary,
    }
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

// ============================================================================
// HTML heuristics
// ============================================================================

/// Best-effort parse of a status-page document.
pub fn parse_status_html(html: &str, service: &str) -> ServiceStatus {
    let doc = Html::parse_document(html);
    let mut status = ServiceState::Unknown;

    // Elements whose class mentions "status" usually carry the verdict.
    if let Ok(selector) = Selector::parse("[class*=status]") {
        for el in doc.select(&selector).take(20) {
            let text: String = el.text().collect::<Vec<_>>().join(" ");
            let normalized = normalize_status(&text);
            if normalized != ServiceState::Unknown {
                status = normalized;
                break;
            }
        }
    }

    // Whole-page keyword sweep when the class scan came up empty.
    if status == ServiceState::Unknown {
        let lowered = html.to_lowercase();
        status = if lowered.contains("all systems operational")
            || lowered.contains("all systems normal")
            || lowered.contains("no active incidents")
            || lowered.contains("no incidents")
        {
            ServiceState::Operational
        } else if lowered.contains("investigating") || lowered.contains("identified") {
            ServiceState::DegradedPerformance
        } else if lowered.contains("outage") {
            ServiceState::PartialOutage
        } else if lowered.contains("maintenance") {
            ServiceState::UnderMaintenance
        } else {
            ServiceState::Unknown
        };
    }

    let mut current_incidents = Vec::new();
    if let Ok(selector) = Selector::parse("[class*=incident]") {
        for el in doc.select(&selector) {
            if current_incidents.len() >= MAX_INCIDENTS {
                break;
            }
            let title = ["h3", "h4", "span"]
                .iter()
                .filter_map(|tag| Selector::parse(tag).ok())
                .filter_map(|sel| {
                    el.select(&sel)
                        .map(|t| t.text().collect::<String>().trim().to_string())
                        .find(|t| !t.is_empty())
                })
                .next();
            if let Some(title) = title {
                current_incidents.push(ServiceIncident {
                    title,
                    status: None,
                    started_at: None,
                    resolved_at: None,
                    impact: None,
                    summary: None,
                });
            }
        }
    }

    let mut components = Vec::new();
    if let (Ok(comp_sel), Ok(name_sel), Ok(status_sel)) = (
        Selector::parse("[class*=component]"),
        Selector::parse("[class*=name]"),
        Selector::parse("[class*=status]"),
    ) {
        for el in doc.select(&comp_sel) {
            if components.len() >= MAX_COMPONENTS {
                break;
            }
            let name = el
                .select(&name_sel)
                .next()
                .map(|n| n.text().collect::<String>().trim().to_string());
            let comp_status = el
                .select(&status_sel)
                .next()
                .map(|s| normalize_status(&s.text().collect::<String>()));
            if let (Some(name), Some(comp_status)) = (name, comp_status) {
                if !name.is_empty() {
                    components.push(ServiceComponent {
                        name,
                        status: comp_status,
                    });
                }
            }
        }
    }

    ServiceStatus {
        service: service.to_string(),
        status,
        status_page_url: None,
        checked_at: now_iso(),
        current_incidents,
        components,
        recent_incidents: None,
        uptime_percentage: None,
        note: None,
    }
}

/// Map loose status wording into the closed state set.
pub fn normalize_status(text: &str) -> ServiceState {
    let lowered = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if has(&["operational", "normal", "all systems", " up"]) || lowered.trim() == "ok" {
        ServiceState::Operational
    } else if has(&["degraded", "slow", "performance"]) {
        ServiceState::DegradedPerformance
    } else if has(&["partial", "some", "limited"]) {
        ServiceState::PartialOutage
    } else if has(&["major", "down", "outage", "offline"]) {
        ServiceState::MajorOutage
    } else if lowered.contains("maintenance") {
        ServiceState::UnderMaintenance
    } else {
        ServiceState::Unknown
    }
}

// ============================================================================
// Service-name resolution
// ============================================================================

/// Canonicalize a service name: alias resolution, suffix stripping, and
/// separator removal.
pub fn normalize_service_name(service: &str) -> String {
    let lowered = service.to_lowercase().trim().to_string();

    if let Some(canonical) = SERVICE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| canonical)
    {
        return (*canonical).to_string();
    }
    // Partial alias matching ("anthropic claude api v2" still means anthropic).
    for (alias, canonical) in SERVICE_ALIASES {
        if lowered.contains(alias) || alias.contains(&lowered) {
            return (*canonical).to_string();
        }
    }

    let mut cleaned = lowered;
    for suffix in [" api", " status", " service"] {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            cleaned = stripped.trim().to_string();
        }
    }
    clean_service_name(&cleaned)
}

fn clean_service_name(service: &str) -> String {
    service
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .collect()
}

fn known_status_page(normalized: &str) -> Option<&'static str> {
    KNOWN_STATUS_PAGES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, url)| *url)
}

/// Alias → canonical service name.
const SERVICE_ALIASES: &[(&str, &str)] = &[
    ("anthropic claude", "anthropic"),
    ("anthropic claude api", "anthropic"),
    ("claude api", "anthropic"),
    ("claude", "anthropic"),
    ("google cloud", "gcp"),
    ("google cloud platform", "gcp"),
    ("google cloud vertex ai", "vertexai"),
    ("vertex ai", "vertexai"),
    ("google gemini", "gemini"),
    ("google gemini api", "gemini"),
    ("gemini api", "gemini"),
    ("fal.ai", "fal"),
    ("fal ai", "fal"),
    ("fal.ai api", "fal"),
    ("black forest labs", "bfl"),
    ("black forest labs flux", "bfl"),
    ("bfl flux", "bfl"),
    ("flux api", "bfl"),
    ("sync.so", "sync"),
    ("sync labs", "sync"),
    ("eleven labs", "elevenlabs"),
    ("stability ai", "stability"),
    ("runway ml", "runway"),
    ("leonardo ai", "leonardo"),
    ("hugging face", "huggingface"),
    ("together ai", "together"),
    ("mistral ai", "mistral"),
    ("perplexity ai", "perplexity"),
    ("luma labs", "luma"),
    ("fly.io", "fly"),
];

/// Curated service → status-page table.
const KNOWN_STATUS_PAGES: &[(&str, &str)] = &[
    // Payments & finance
    ("stripe", "https://status.stripe.com"),
    ("paypal", "https://www.paypal-status.com"),
    ("plaid", "https://status.plaid.com"),
    // Code & devops
    ("github", "https://www.githubstatus.com"),
    ("gitlab", "https://status.gitlab.com"),
    ("bitbucket", "https://bitbucket.status.atlassian.com"),
    ("vercel", "https://www.vercel-status.com"),
    ("netlify", "https://www.netlifystatus.com"),
    ("heroku", "https://status.heroku.com"),
    ("docker", "https://status.docker.com"),
    ("dockerhub", "https://status.docker.com"),
    ("npm", "https://status.npmjs.org"),
    ("pypi", "https://status.python.org"),
    ("circleci", "https://status.circleci.com"),
    // AI & ML
    ("openai", "https://status.openai.com"),
    ("anthropic", "https://status.anthropic.com"),
    ("gemini", "https://status.cloud.google.com"),
    ("vertexai", "https://status.cloud.google.com"),
    ("googlecloud", "https://status.cloud.google.com"),
    ("replicate", "https://replicate.statuspage.io"),
    ("huggingface", "https://status.huggingface.co"),
    ("hf", "https://status.huggingface.co"),
    ("cohere", "https://status.cohere.com"),
    ("mistral", "https://status.mistral.ai"),
    ("together", "https://status.together.ai"),
    ("groq", "https://status.groq.com"),
    ("perplexity", "https://status.perplexity.ai"),
    // Image / video AI
    ("fal", "https://fal.statuspage.io"),
    ("midjourney", "https://status.midjourney.com"),
    ("stability", "https://status.stability.ai"),
    ("runway", "https://status.runwayml.com"),
    ("leonardo", "https://status.leonardo.ai"),
    ("ideogram", "https://status.ideogram.ai"),
    ("flux", "https://status.bfl.ml"),
    ("bfl", "https://status.bfl.ml"),
    // Voice / audio AI
    ("elevenlabs", "https://status.elevenlabs.io"),
    ("11labs", "https://status.elevenlabs.io"),
    ("resemble", "https://status.resemble.ai"),
    ("assemblyai", "https://status.assemblyai.com"),
    ("deepgram", "https://status.deepgram.com"),
    // Video AI
    ("heygen", "https://status.heygen.com"),
    ("descript", "https://status.descript.com"),
    ("luma", "https://status.lumalabs.ai"),
    ("pika", "https://status.pika.art"),
    ("sync", "https://status.sync.so"),
    // Cloud providers
    ("aws", "https://health.aws.amazon.com/health/status"),
    ("amazon", "https://health.aws.amazon.com/health/status"),
    ("gcp", "https://status.cloud.google.com"),
    ("azure", "https://status.azure.com"),
    ("microsoft", "https://status.azure.com"),
    ("digitalocean", "https://status.digitalocean.com"),
    ("linode", "https://status.linode.com"),
    ("vultr", "https://status.vultr.com"),
    ("render", "https://status.render.com"),
    ("railway", "https://railway.instatus.com"),
    ("fly", "https://status.fly.io"),
    // Databases
    ("mongodb", "https://status.mongodb.com"),
    ("supabase", "https://status.supabase.com"),
    ("planetscale", "https://www.planetscalestatus.com"),
    ("neon", "https://neonstatus.com"),
    ("fauna", "https://status.fauna.com"),
    ("redis", "https://status.redis.com"),
    ("upstash", "https://status.upstash.com"),
    ("cockroachdb", "https://status.cockroachlabs.cloud"),
    // Communication
    ("twilio", "https://status.twilio.com"),
    ("sendgrid", "https://status.sendgrid.com"),
    ("mailgun", "https://status.mailgun.com"),
    ("postmark", "https://status.postmarkapp.com"),
    ("slack", "https://status.slack.com"),
    ("discord", "https://discordstatus.com"),
    ("zoom", "https://status.zoom.us"),
    ("intercom", "https://www.intercomstatus.com"),
    // CDN & DNS
    ("cloudflare", "https://www.cloudflarestatus.com"),
    ("fastly", "https://status.fastly.com"),
    // Auth & identity
    ("auth0", "https://status.auth0.com"),
    ("okta", "https://status.okta.com"),
    ("clerk", "https://status.clerk.com"),
    // Analytics & monitoring
    ("datadog", "https://status.datadoghq.com"),
    ("newrelic", "https://status.newrelic.com"),
    ("sentry", "https://status.sentry.io"),
    ("mixpanel", "https://status.mixpanel.com"),
    ("amplitude", "https://status.amplitude.com"),
    ("segment", "https://status.segment.com"),
    ("posthog", "https://status.posthog.com"),
    // Other SaaS
    ("notion", "https://status.notion.so"),
    ("airtable", "https://status.airtable.com"),
    ("figma", "https://status.figma.com"),
    ("linear", "https://linearstatus.com"),
    ("jira", "https://jira-software.status.atlassian.com"),
    ("confluence", "https://confluence.status.atlassian.com"),
    ("atlassian", "https://status.atlassian.com"),
    ("shopify", "https://www.shopifystatus.com"),
    ("algolia", "https://status.algolia.com"),
    ("pinecone", "https://status.pinecone.io"),
    ("weaviate", "https://status.weaviate.io"),
    ("qdrant", "https://status.qdrant.io"),
    ("milvus", "https://status.milvus.io"),
];

// ============================================================================
// Statuspage wire shapes
// ============================================================================

#[derive(Deserialize)]
struct StatuspageStatusDoc {
    status: Option<StatuspageStatus>,
}

#[derive(Deserialize)]
struct StatuspageStatus {
    indicator: String,
}

#[derive(Deserialize)]
struct StatuspageIncidentsDoc {
    #[serde(default)]
    incidents: Vec<StatuspageIncident>,
}

#[derive(Deserialize)]
struct StatuspageIncident {
    name: String,
    status: Option<String>,
    impact: Option<String>,
    created_at: Option<String>,
    started_at: Option<String>,
    resolved_at: Option<String>,
    #[serde(default)]
    incident_updates: Vec<StatuspageIncidentUpdate>,
}

#[derive(Deserialize)]
struct StatuspageIncidentUpdate {
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
struct StatuspageComponentsDoc {
    #[serde(default)]
    components: Vec<StatuspageComponent>,
}

#[derive(Deserialize)]
struct StatuspageComponent {
    name: String,
    #[serde(default)]
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_variants_resolve_to_anthropic() {
        for input in ["claude api", "anthropic claude", "anthropic", "Claude"] {
            assert_eq!(
                StatusClient::find_status_page(input).as_deref(),
                Some("https://status.anthropic.com"),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn stripe_resolves_from_the_known_table() {
        assert_eq!(
            StatusClient::find_status_page("stripe").as_deref(),
            Some("https://status.stripe.com")
        );
        assert_eq!(
            StatusClient::find_status_page("Stripe API").as_deref(),
            Some("https://status.stripe.com")
        );
    }

    #[test]
    fn unknown_services_enumerate_patterns() {
        assert_eq!(StatusClient::find_status_page("nonexistent-xyz"), None);
        let candidates = StatusClient::candidate_urls("nonexistent-xyz");
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[0], "https://status.nonexistentxyz.com");
        assert_eq!(candidates[1], "https://nonexistentxyz.statuspage.io");
    }

    #[test]
    fn status_normalization_covers_the_closed_set() {
        assert_eq!(normalize_status("All Systems Operational"), ServiceState::Operational);
        assert_eq!(normalize_status("Degraded performance"), ServiceState::DegradedPerformance);
        assert_eq!(normalize_status("Partial outage on API"), ServiceState::PartialOutage);
        assert_eq!(normalize_status("Major outage"), ServiceState::MajorOutage);
        assert_eq!(normalize_status("Scheduled maintenance"), ServiceState::UnderMaintenance);
        assert_eq!(normalize_status("???"), ServiceState::Unknown);
    }

    #[test]
    fn emoji_is_pure_over_states() {
        assert_eq!(ServiceState::Operational.emoji(), "✅");
        assert_eq!(ServiceState::MajorOutage.emoji(), "🚨");
        assert_eq!(ServiceState::Unknown.emoji(), "❓");
    }

    #[test]
    fn html_heuristics_find_operational_state() {
        let html = r#"<html><body>
            <div class="page-status status-none"><span>All Systems Operational</span></div>
        </body></html>"#;
        let status = parse_status_html(html, "example");
        assert_eq!(status.status, ServiceState::Operational);
        assert!(status.current_incidents.is_empty());
    }

    #[test]
    fn html_heuristics_capture_incidents() {
        let html = r#"<html><body>
            <div class="unresolved-incident"><h3>API latency elevated</h3></div>
            <p>We are investigating reports.</p>
        </body></html>"#;
        let status = parse_status_html(html, "example");
        assert_eq!(status.status, ServiceState::DegradedPerformance);
        assert_eq!(status.current_incidents[0].title, "API latency elevated");
    }
}
