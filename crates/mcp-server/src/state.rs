//! Process-wide state: immutable config, one instance of every upstream
//! client and pipeline, and the usage tracker.

use std::sync::Arc;

use research_clients::{
    DomainHealthTracker, Fetcher, GitHubClient, PixabayClient, RegistryClient, SearchClient,
    StatusClient,
};
use research_core::Config;
use research_pipelines::{ChangelogEngine, Comparator, DocDiscoverer, ErrorParser, Extractor};
use research_usage::UsageTracker;

/// Everything a tool handler can reach. Constructed once in `main`; all
/// clients are immutable after construction, and the tracker carries the
/// only mutable state (behind its own mutex).
pub struct AppState {
    pub config: Config,
    pub search: SearchClient,
    pub fetcher: Fetcher,
    pub registry: RegistryClient,
    pub github: GitHubClient,
    pub images: PixabayClient,
    pub status: StatusClient,
    pub error_parser: ErrorParser,
    pub doc_discoverer: DocDiscoverer,
    pub extractor: Extractor,
    pub changelog: ChangelogEngine,
    pub comparator: Comparator,
    pub domain_health: Arc<DomainHealthTracker>,
    pub tracker: UsageTracker,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let domain_health = Arc::new(DomainHealthTracker::default());
        let search = SearchClient::new(&config);
        let fetcher = Fetcher::new(&config, Arc::clone(&domain_health));
        let registry = RegistryClient::new(&config);
        let github = GitHubClient::new(&config);
        let tracker = UsageTracker::open(config.usage_log_path.clone());

        Self {
            images: PixabayClient::new(&config),
            status: StatusClient::new(&config),
            error_parser: ErrorParser::new(),
            doc_discoverer: DocDiscoverer::new(search.clone(), fetcher.clone()),
            extractor: Extractor::new(),
            changelog: ChangelogEngine::new(registry.clone(), github.clone()),
            comparator: Comparator::new(search.clone(), github.clone(), registry.clone()),
            domain_health,
            tracker,
            search,
            fetcher,
            registry,
            github,
            config,
        }
    }
}
