//! Upstream adapter layer.
//!
//! One module per external dependency, each exposing a small typed surface
//! over its wire protocol and mapping failures into the shared
//! [`research_core::ResearchError`] taxonomy. Clients are constructed once
//! at startup around a shared `reqwest::Client` and reused for the life of
//! the process; none of them holds mutable state.

pub mod crawler;
pub mod domain_health;
pub mod github;
pub mod http;
pub mod images;
pub mod registry;
pub mod search;
pub mod status;

pub use crawler::{FetchStatus, Fetcher};
pub use domain_health::{DomainHealthTracker, DomainMetrics};
pub use github::{Commit, GitHubClient, RepoInfo};
pub use images::{ImageResult, PixabayClient};
pub use registry::{PackageInfo, RegistryClient, RegistryKind};
pub use search::{SearchClient, SearchHit};
pub use status::{ServiceComponent, ServiceIncident, ServiceState, ServiceStatus, StatusClient};
