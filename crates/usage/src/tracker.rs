//! Process-wide usage tracker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Reasoning strings are fingerprinted to their first 50 characters for
/// summary aggregation.
const REASONING_FINGERPRINT_CHARS: usize = 50;

const APP_DIR: &str = "web-research-assistant";
const USAGE_FILE: &str = "usage.json";

/// One recorded invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    /// UTC ISO-8601, assigned at completion.
    pub timestamp: String,
    pub tool: String,
    pub reasoning: String,
    pub parameters: serde_json::Value,
    pub response_time_ms: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// UTF-8 byte length of the final (clamped) reply body.
    pub response_size_bytes: u64,
    /// `YYYYMMDD_HH`, grouping events within one wall-clock hour.
    pub session_id: String,
}

/// Event fields supplied by the orchestrator; timestamp and session id are
/// filled in by the tracker.
#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub tool: String,
    pub reasoning: String,
    pub parameters: serde_json::Value,
    pub response_time_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_size_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolSummary {
    pub count: u64,
    pub success_count: u64,
    /// Running mean over events in append order.
    pub avg_response_time: f64,
    /// reasoning[:50] → occurrence count.
    pub common_reasonings: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageTotals {
    pub total_calls: u64,
    pub most_used_tool: Option<String>,
    pub average_response_time: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageSummary {
    pub tools: BTreeMap<String, ToolSummary>,
    pub totals: UsageTotals,
}

/// On-disk schema: the full event list plus the derived summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStore {
    pub sessions: Vec<UsageEvent>,
    pub summary: UsageSummary,
}

/// Thread-safe tracker; a single mutex guards append + summary update +
/// disk flush so concurrent calls cannot interleave writes.
pub struct UsageTracker {
    path: PathBuf,
    store: Mutex<UsageStore>,
}

impl UsageTracker {
    /// Open the tracker at `override_path`, or the default location
    /// (`$XDG_CONFIG_HOME/web-research-assistant/usage.json`).
    ///
    /// A corrupt existing file is logged and replaced with an empty store;
    /// the summary is always re-derived from the persisted events.
    pub fn open(override_path: Option<PathBuf>) -> Self {
        let path = override_path.unwrap_or_else(default_usage_path);
        let mut store = load_store_best_effort(&path);
        store.summary = derive_summary(&store.sessions);
        Self {
            path,
            store: Mutex::new(store),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event and flush the store to disk.
    ///
    /// The flush happens inside the critical section: after `track`
    /// returns, the on-disk store contains the event.
    pub async fn track(&self, request: TrackRequest) {
        let now = Utc::now();
        let event = UsageEvent {
            timestamp: now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            session_id: now.format("%Y%m%d_%H").to_string(),
            tool: request.tool,
            reasoning: request.reasoning,
            parameters: request.parameters,
            response_time_ms: request.response_time_ms,
            success: request.success,
            error_message: request.error_message,
            response_size_bytes: request.response_size_bytes,
        };

        let mut store = self.store.lock().await;
        apply_event(&mut store.summary, &event);
        store.sessions.push(event);
        if let Err(err) = flush(&self.path, &store).await {
            log::warn!("usage flush to {} failed: {err}", self.path.display());
        }
    }

    /// Snapshot of the current summary.
    pub async fn summary(&self) -> UsageSummary {
        self.store.lock().await.summary.clone()
    }

    /// Number of recorded events.
    pub async fn event_count(&self) -> usize {
        self.store.lock().await.sessions.len()
    }
}

fn default_usage_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR).join(USAGE_FILE)
}

fn load_store_best_effort(path: &Path) -> UsageStore {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return UsageStore::default(),
    };
    match serde_json::from_slice(&bytes) {
        Ok(store) => store,
        Err(err) => {
            log::warn!(
                "usage store {} is corrupt ({err}); starting empty",
                path.display()
            );
            UsageStore::default()
        }
    }
}

/// Incremental summary update for one appended event.
fn apply_event(summary: &mut UsageSummary, event: &UsageEvent) {
    let tool = summary.tools.entry(event.tool.clone()).or_default();
    tool.count += 1;
    if event.success {
        tool.success_count += 1;
    }
    tool.avg_response_time += (event.response_time_ms - tool.avg_response_time) / tool.count as f64;
    let fingerprint: String = event
        .reasoning
        .chars()
        .take(REASONING_FINGERPRINT_CHARS)
        .collect();
    *tool.common_reasonings.entry(fingerprint).or_insert(0) += 1;

    summary.totals.total_calls += 1;
    summary.totals.average_response_time += (event.response_time_ms
        - summary.totals.average_response_time)
        / summary.totals.total_calls as f64;
    summary.totals.most_used_tool = summary
        .tools
        .iter()
        .max_by_key(|(_, s)| s.count)
        .map(|(name, _)| name.clone());
}

/// Recompute the summary from scratch, replaying events in append order so
/// running means match the incremental path exactly.
pub fn derive_summary(events: &[UsageEvent]) -> UsageSummary {
    let mut summary = UsageSummary::default();
    for event in events {
        apply_event(&mut summary, event);
    }
    summary
}

/// Atomic flush: serialize, write a temp file in the same directory, then
/// rename over the real path.
async fn flush(path: &Path, store: &UsageStore) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let data = serde_json::to_vec_pretty(store)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &data).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tool: &str, reasoning: &str, ms: f64, success: bool) -> TrackRequest {
        TrackRequest {
            tool: tool.to_string(),
            reasoning: reasoning.to_string(),
            parameters: serde_json::json!({"q": "x"}),
            response_time_ms: ms,
            success,
            error_message: None,
            response_size_bytes: 42,
        }
    }

    #[tokio::test]
    async fn track_appends_flushes_and_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        let tracker = UsageTracker::open(Some(path.clone()));

        tracker.track(request("web_search", "find docs", 100.0, true)).await;
        tracker.track(request("web_search", "find docs", 200.0, false)).await;
        tracker.track(request("crawl_url", "read page", 50.0, true)).await;

        let summary = tracker.summary().await;
        let web = &summary.tools["web_search"];
        assert_eq!(web.count, 2);
        assert_eq!(web.success_count, 1);
        assert!((web.avg_response_time - 150.0).abs() < 1e-9);
        assert_eq!(web.common_reasonings["find docs"], 2);
        assert_eq!(summary.totals.total_calls, 3);
        assert_eq!(summary.totals.most_used_tool.as_deref(), Some("web_search"));

        // The on-disk store is valid JSON with the documented schema.
        let on_disk: UsageStore =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.sessions.len(), 3);
        assert_eq!(on_disk.summary.totals.total_calls, 3);
        // No stray temp file after a successful flush.
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn reload_rederives_an_identical_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");

        {
            let tracker = UsageTracker::open(Some(path.clone()));
            tracker.track(request("github_repo", "evaluate", 80.0, true)).await;
            tracker.track(request("github_repo", "evaluate", 120.0, true)).await;
            tracker.track(request("web_search", "research", 60.0, true)).await;
        }

        let first = std::fs::read(&path).unwrap();
        let reopened = UsageTracker::open(Some(path.clone()));
        let summary = reopened.summary().await;

        let parsed: UsageStore = serde_json::from_slice(&first).unwrap();
        assert_eq!(summary, parsed.summary);
        assert_eq!(summary, derive_summary(&parsed.sessions));
    }

    #[tokio::test]
    async fn corrupt_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, b"{ not json !").unwrap();

        let tracker = UsageTracker::open(Some(path.clone()));
        assert_eq!(tracker.event_count().await, 0);

        tracker.track(request("web_search", "recover", 10.0, true)).await;
        let on_disk: UsageStore =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.sessions.len(), 1);
    }

    #[tokio::test]
    async fn session_id_matches_wall_clock_hour() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = UsageTracker::open(Some(dir.path().join("usage.json")));
        tracker.track(request("web_search", "now", 1.0, true)).await;

        let expected = Utc::now().format("%Y%m%d_%H").to_string();
        let store = tracker.store.lock().await;
        assert_eq!(store.sessions[0].session_id, expected);
    }

    #[test]
    fn reasoning_fingerprint_truncates_to_50() {
        let mut summary = UsageSummary::default();
        let long = "r".repeat(80);
        let event = UsageEvent {
            timestamp: "t".into(),
            tool: "x".into(),
            reasoning: long,
            parameters: serde_json::Value::Null,
            response_time_ms: 1.0,
            success: true,
            error_message: None,
            response_size_bytes: 0,
            session_id: "s".into(),
        };
        apply_event(&mut summary, &event);
        let key = summary.tools["x"].common_reasonings.keys().next().unwrap();
        assert_eq!(key.chars().count(), 50);
    }
}
