//! Rolling-window fetch health per domain.
//!
//! Every fetch the crawler performs is recorded here; the tracker keeps one
//! hour of events per domain and answers "is this domain worth fetching
//! from" questions plus a human-readable report. In-memory only; resets on
//! restart.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::crawler::FetchStatus;

const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);
const BLOCK_RATE_UNHEALTHY: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
struct DomainEvent {
    at: Instant,
    status: FetchStatus,
    response_time_ms: f64,
}

/// Aggregated view of one domain inside the rolling window.
#[derive(Debug, Clone)]
pub struct DomainMetrics {
    pub domain: String,
    pub total_requests: usize,
    pub success_count: usize,
    pub blocked_count: usize,
    pub rate_limited_count: usize,
    pub error_count: usize,
    pub avg_response_time_ms: f64,
    pub last_status: FetchStatus,
}

impl DomainMetrics {
    pub fn success_rate(&self) -> f64 {
        percentage(self.success_count, self.total_requests)
    }

    pub fn block_rate(&self) -> f64 {
        percentage(self.blocked_count, self.total_requests)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Thread-safe, in-memory fetch-health tracker with a rolling window.
pub struct DomainHealthTracker {
    window: Duration,
    events: Mutex<HashMap<String, VecDeque<DomainEvent>>>,
}

impl Default for DomainHealthTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl DomainHealthTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Record one fetch outcome for `domain`.
    pub fn record(&self, domain: &str, status: FetchStatus, response_time_ms: f64) {
        let mut events = self.events.lock().expect("domain health lock poisoned");
        let queue = events.entry(domain.to_string()).or_default();
        queue.push_back(DomainEvent {
            at: Instant::now(),
            status,
            response_time_ms,
        });
        Self::prune(queue, self.window);
    }

    /// Metrics for one domain, or `None` when nothing is inside the window.
    pub fn domain_metrics(&self, domain: &str) -> Option<DomainMetrics> {
        let mut events = self.events.lock().expect("domain health lock poisoned");
        let queue = events.get_mut(domain)?;
        Self::prune(queue, self.window);
        if queue.is_empty() {
            events.remove(domain);
            return None;
        }

        let total = queue.len();
        let mut success = 0;
        let mut blocked = 0;
        let mut rate_limited = 0;
        let mut errors = 0;
        let mut time_sum = 0.0;
        for event in queue.iter() {
            match event.status {
                FetchStatus::Ok => success += 1,
                FetchStatus::Blocked => blocked += 1,
                FetchStatus::RateLimited => rate_limited += 1,
                FetchStatus::Error => errors += 1,
            }
            time_sum += event.response_time_ms;
        }
        let last_status = queue.back().map(|e| e.status).unwrap_or(FetchStatus::Error);

        Some(DomainMetrics {
            domain: domain.to_string(),
            total_requests: total,
            success_count: success,
            blocked_count: blocked,
            rate_limited_count: rate_limited,
            error_count: errors,
            avg_response_time_ms: time_sum / total as f64,
            last_status,
        })
    }

    /// All tracked domains, sorted by block rate descending.
    pub fn all_metrics(&self) -> Vec<DomainMetrics> {
        let domains: Vec<String> = {
            let events = self.events.lock().expect("domain health lock poisoned");
            events.keys().cloned().collect()
        };
        let mut metrics: Vec<DomainMetrics> = domains
            .iter()
            .filter_map(|d| self.domain_metrics(d))
            .collect();
        metrics.sort_by(|a, b| {
            b.block_rate()
                .partial_cmp(&a.block_rate())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        metrics
    }

    /// A domain is unhealthy once more than half of its recent fetches were
    /// blocked.
    pub fn is_domain_healthy(&self, domain: &str) -> bool {
        match self.domain_metrics(domain) {
            Some(metrics) => metrics.block_rate() <= BLOCK_RATE_UNHEALTHY,
            None => true,
        }
    }

    /// Markdown report over every tracked domain.
    pub fn format_report(&self) -> String {
        let metrics = self.all_metrics();
        if metrics.is_empty() {
            return "No domain metrics recorded yet.".to_string();
        }

        let mut lines = vec![
            "# Domain Health Report".to_string(),
            format!("Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")),
            String::new(),
            format!("Total domains tracked: {}", metrics.len()),
            String::new(),
        ];
        for m in &metrics {
            lines.push(format!("## {}", m.domain));
            lines.push(format!("- Requests: {}", m.total_requests));
            lines.push(format!("- Success rate: {:.1}%", m.success_rate()));
            lines.push(format!("- Block rate: {:.1}%", m.block_rate()));
            lines.push(format!("- Rate limited: {}", m.rate_limited_count));
            lines.push(format!("- Errors: {}", m.error_count));
            lines.push(format!("- Avg response time: {:.1}ms", m.avg_response_time_ms));
            lines.push(format!("- Last status: {}", m.last_status.as_str()));
            lines.push(String::new());
        }
        lines.join("\n")
    }

    fn prune(queue: &mut VecDeque<DomainEvent>, window: Duration) {
        let now = Instant::now();
        while queue
            .front()
            .is_some_and(|e| now.duration_since(e.at) > window)
        {
            queue.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rate_at_half_is_still_healthy() {
        let tracker = DomainHealthTracker::default();
        tracker.record("example.com", FetchStatus::Blocked, 120.0);
        tracker.record("example.com", FetchStatus::Ok, 80.0);

        let metrics = tracker.domain_metrics("example.com").unwrap();
        assert_eq!(metrics.total_requests, 2);
        assert!((metrics.block_rate() - 50.0).abs() < f64::EPSILON);
        assert!(tracker.is_domain_healthy("example.com"));
    }

    #[test]
    fn majority_blocked_is_unhealthy() {
        let tracker = DomainHealthTracker::default();
        for _ in 0..3 {
            tracker.record("blocked.example", FetchStatus::Blocked, 50.0);
        }
        tracker.record("blocked.example", FetchStatus::Ok, 50.0);
        assert!(!tracker.is_domain_healthy("blocked.example"));
    }

    #[test]
    fn unknown_domain_is_healthy_and_reportless() {
        let tracker = DomainHealthTracker::default();
        assert!(tracker.is_domain_healthy("never-seen.example"));
        assert_eq!(tracker.format_report(), "No domain metrics recorded yet.");
    }

    #[test]
    fn report_sorts_worst_domain_first() {
        let tracker = DomainHealthTracker::default();
        tracker.record("fine.example", FetchStatus::Ok, 10.0);
        tracker.record("bad.example", FetchStatus::Blocked, 10.0);
        let all = tracker.all_metrics();
        assert_eq!(all[0].domain, "bad.example");
    }
}
