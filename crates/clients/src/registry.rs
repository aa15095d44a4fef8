//! Package-registry adapters: npm, PyPI, crates.io, and the Go module proxy.
//!
//! Lookup returns one [`PackageInfo`] per package or `NOT_FOUND`; discovery
//! uses the native search endpoint where one exists (npm, crates.io) and
//! GitHub repository search as a proxy elsewhere (PyPI, Go), in which case
//! the returned names are candidates, not registry-verified packages.

use std::collections::HashMap;

use serde::Deserialize;

use research_core::timefmt::{format_count, format_time_ago};
use research_core::{Config, ResearchError, Result};

use crate::http;

const NPM_BASE: &str = "https://registry.npmjs.org";
const NPM_DOWNLOADS_BASE: &str = "https://api.npmjs.org/downloads/point/last-week";
const PYPI_BASE: &str = "https://pypi.org/pypi";
const CRATES_BASE: &str = "https://crates.io/api/v1/crates";
const GO_PROXY_BASE: &str = "https://proxy.golang.org";
const GITHUB_SEARCH_BASE: &str = "https://api.github.com/search/repositories";

const PYPI_LICENSE_MAX_CHARS: usize = 100;

/// The four supported registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Npm,
    PyPi,
    Crates,
    Go,
}

impl RegistryKind {
    /// Parse a registry name as it appears in tool parameters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "npm" => Some(Self::Npm),
            "pypi" => Some(Self::PyPi),
            "crates" | "crates.io" | "cargo" => Some(Self::Crates),
            "go" | "golang" => Some(Self::Go),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::PyPi => "pypi",
            Self::Crates => "crates",
            Self::Go => "go",
        }
    }

    /// Display label used in replies.
    pub fn label(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::PyPi => "PyPI",
            Self::Crates => "crates.io",
            Self::Go => "Go modules",
        }
    }
}

/// Normalized package record, one per lookup.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub registry: RegistryKind,
    pub version: String,
    pub description: String,
    pub license: Option<String>,
    /// Human-formatted download figure, e.g. `50.3M/week` for npm.
    pub downloads: Option<String>,
    /// Relative form ("3d ago") derived from the registry timestamp.
    pub last_updated: String,
    pub repository: Option<String>,
    pub dependencies_count: Option<usize>,
    pub homepage: Option<String>,
}

/// One discovery hit; for PyPI/Go these are GitHub-derived candidates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PackageSearchHit {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    github_token: Option<String>,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http::build_client(config, config.registry_timeout),
            github_token: config.github_token.clone(),
        }
    }

    /// Look up the latest published state of `name` in `registry`.
    pub async fn package_info(&self, registry: RegistryKind, name: &str) -> Result<PackageInfo> {
        match registry {
            RegistryKind::Npm => self.npm_info(name).await,
            RegistryKind::PyPi => self.pypi_info(name).await,
            RegistryKind::Crates => self.crates_info(name).await,
            RegistryKind::Go => self.go_info(name).await,
        }
    }

    /// Discover packages matching `query` in `registry`.
    pub async fn package_search(
        &self,
        registry: RegistryKind,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<PackageSearchHit>> {
        match registry {
            RegistryKind::Npm => self.npm_search(query, max_results).await,
            RegistryKind::Crates => self.crates_search(query, max_results).await,
            RegistryKind::PyPi => {
                self.github_proxy_search(query, "python", max_results, |owner, repo| {
                    let _ = owner;
                    repo.to_string()
                })
                .await
            }
            RegistryKind::Go => {
                self.github_proxy_search(query, "go", max_results, |owner, repo| {
                    format!("github.com/{owner}/{repo}")
                })
                .await
            }
        }
    }

    // ------------------------------------------------------------------
    // npm
    // ------------------------------------------------------------------

    async fn npm_info(&self, name: &str) -> Result<PackageInfo> {
        let url = format!("{NPM_BASE}/{}", urlencoding::encode(name));
        let doc: NpmPackage = self.get_json("npm registry", &url).await.map_err(|e| {
            not_found_or(e, format!("Package '{name}' not found on npm"))
        })?;

        let latest = doc
            .dist_tags
            .as_ref()
            .and_then(|tags| tags.get("latest"))
            .cloned()
            .unwrap_or_default();
        let last_updated = doc
            .time
            .as_ref()
            .and_then(|t| t.get(&latest).or_else(|| t.get("modified")))
            .map(|iso| format_time_ago(iso))
            .unwrap_or_else(|| "unknown".to_string());
        let version_entry = doc.versions.as_ref().and_then(|v| v.get(&latest));
        let dependencies_count = version_entry
            .and_then(|v| v.dependencies.as_ref())
            .map(|deps| deps.len());

        // Downloads live on a separate endpoint; failure there degrades to
        // "unknown" rather than failing the lookup.
        let downloads = self.npm_weekly_downloads(name).await;

        Ok(PackageInfo {
            name: name.to_string(),
            registry: RegistryKind::Npm,
            version: latest,
            description: doc.description.unwrap_or_default(),
            license: doc.license.map(|l| l.into_string()),
            downloads,
            last_updated,
            repository: doc.repository.and_then(|r| r.into_url()),
            dependencies_count,
            homepage: doc.homepage,
        })
    }

    async fn npm_weekly_downloads(&self, name: &str) -> Option<String> {
        let url = format!("{NPM_DOWNLOADS_BASE}/{}", urlencoding::encode(name));
        let doc: NpmDownloads = self.get_json("npm downloads", &url).await.ok()?;
        Some(format!("{}/week", format_count(doc.downloads)))
    }

    async fn npm_search(&self, query: &str, max_results: usize) -> Result<Vec<PackageSearchHit>> {
        let url = format!(
            "{NPM_BASE}/-/v1/search?text={}&size={max_results}",
            urlencoding::encode(query)
        );
        let doc: NpmSearchResponse = self.get_json("npm registry", &url).await?;
        Ok(doc
            .objects
            .into_iter()
            .take(max_results)
            .map(|obj| PackageSearchHit {
                name: obj.package.name,
                version: obj.package.version,
                description: obj.package.description,
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // PyPI
    // ------------------------------------------------------------------

    async fn pypi_info(&self, name: &str) -> Result<PackageInfo> {
        let url = format!("{PYPI_BASE}/{}/json", urlencoding::encode(name));
        let doc: PypiPackage = self.get_json("PyPI", &url).await.map_err(|e| {
            not_found_or(e, format!("Package '{name}' not found on PyPI"))
        })?;

        let info = doc.info;
        // project_urls may be absent, null, or contain null values; every
        // case collapses to "no URL of that kind".
        let project_urls = info.project_urls.unwrap_or_default();
        let url_of = |key: &str| -> Option<String> {
            project_urls
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, v)| v.clone())
        };
        let repository = url_of("Source")
            .or_else(|| url_of("Repository"))
            .or_else(|| url_of("Homepage"));
        let homepage = info
            .home_page
            .filter(|h| !h.is_empty())
            .or_else(|| url_of("Homepage"));

        let license = info
            .license
            .filter(|l| !l.trim().is_empty())
            .map(|l| truncate_chars(&l, PYPI_LICENSE_MAX_CHARS));

        let last_updated = doc
            .urls
            .iter()
            .filter_map(|f| f.upload_time_iso_8601.as_deref())
            .max()
            .map(format_time_ago)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(PackageInfo {
            name: name.to_string(),
            registry: RegistryKind::PyPi,
            version: info.version.unwrap_or_default(),
            description: info.summary.unwrap_or_default(),
            license,
            downloads: None,
            last_updated,
            repository,
            dependencies_count: info.requires_dist.map(|d| d.len()),
            homepage,
        })
    }

    // ------------------------------------------------------------------
    // crates.io
    // ------------------------------------------------------------------

    async fn crates_info(&self, name: &str) -> Result<PackageInfo> {
        let url = format!("{CRATES_BASE}/{}", urlencoding::encode(name));
        let doc: CratesResponse = self.get_json("crates.io", &url).await.map_err(|e| {
            not_found_or(e, format!("Crate '{name}' not found on crates.io"))
        })?;

        let krate = doc.krate;
        let license = doc
            .versions
            .first()
            .and_then(|v| v.license.clone())
            .filter(|l| !l.is_empty());

        Ok(PackageInfo {
            name: name.to_string(),
            registry: RegistryKind::Crates,
            version: krate.max_version,
            description: krate.description.unwrap_or_default(),
            license,
            downloads: Some(format_count(krate.downloads)),
            last_updated: krate
                .updated_at
                .map(|iso| format_time_ago(&iso))
                .unwrap_or_else(|| "unknown".to_string()),
            repository: krate.repository,
            dependencies_count: None,
            homepage: krate.homepage,
        })
    }

    async fn crates_search(&self, query: &str, max_results: usize) -> Result<Vec<PackageSearchHit>> {
        let url = format!(
            "{CRATES_BASE}?q={}&per_page={max_results}",
            urlencoding::encode(query)
        );
        let doc: CratesSearchResponse = self.get_json("crates.io", &url).await?;
        Ok(doc
            .crates
            .into_iter()
            .take(max_results)
            .map(|c| PackageSearchHit {
                name: c.name,
                version: Some(c.max_version),
                description: c.description,
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Go module proxy
    // ------------------------------------------------------------------

    async fn go_info(&self, module: &str) -> Result<PackageInfo> {
        // The proxy requires lowercased module paths with `!` escapes for
        // capitals; the common case of already-lowercase paths passes through.
        let escaped = escape_go_module(module);
        let url = format!("{GO_PROXY_BASE}/{escaped}/@latest");
        let doc: GoLatest = self.get_json("Go module proxy", &url).await.map_err(|e| {
            not_found_or(e, format!("Module '{module}' not found on the Go proxy"))
        })?;

        let repository = module
            .starts_with("github.com/")
            .then(|| format!("https://{module}"));

        Ok(PackageInfo {
            name: module.to_string(),
            registry: RegistryKind::Go,
            version: doc.version,
            description: format!("Go module {module}"),
            license: None,
            downloads: None,
            last_updated: doc
                .time
                .map(|iso| format_time_ago(&iso))
                .unwrap_or_else(|| "unknown".to_string()),
            repository,
            dependencies_count: None,
            homepage: Some(format!("https://pkg.go.dev/{module}")),
        })
    }

    // ------------------------------------------------------------------
    // GitHub repository search (PyPI / Go discovery proxy)
    // ------------------------------------------------------------------

    async fn github_proxy_search(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
        to_name: impl Fn(&str, &str) -> String,
    ) -> Result<Vec<PackageSearchHit>> {
        let q = format!("{query} language:{language}");
        let url = format!(
            "{GITHUB_SEARCH_BASE}?q={}&sort=stars&order=desc&per_page={max_results}",
            urlencoding::encode(&q)
        );

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.github_token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let doc: GitHubRepoSearch = request
            .send()
            .await
            .map_err(|e| ResearchError::from_reqwest("GitHub search", e))?
            .error_for_status()
            .map_err(|e| ResearchError::from_reqwest("GitHub search", e))?
            .json()
            .await
            .map_err(|_| ResearchError::UpstreamMalformed {
                upstream: "GitHub search".into(),
                excerpt: "repository search response was not JSON".into(),
            })?;

        Ok(doc
            .items
            .into_iter()
            .take(max_results)
            .filter_map(|item| {
                let (owner, repo) = item.full_name.split_once('/')?;
                Some(PackageSearchHit {
                    name: to_name(owner, repo),
                    version: None,
                    description: item.description,
                })
            })
            .collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        upstream: &str,
        url: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ResearchError::from_reqwest(upstream, e))?
            .error_for_status()
            .map_err(|e| ResearchError::from_reqwest(upstream, e))?;
        response
            .json()
            .await
            .map_err(|_| ResearchError::UpstreamMalformed {
                upstream: upstream.to_string(),
                excerpt: format!("{url} did not return the expected JSON shape"),
            })
    }
}

fn not_found_or(err: ResearchError, message: String) -> ResearchError {
    match err {
        ResearchError::NotFound(_) => ResearchError::NotFound(message),
        other => other,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

fn escape_go_module(module: &str) -> String {
    let mut out = String::with_capacity(module.len());
    for c in module.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Deserialize)]
struct NpmPackage {
    #[serde(rename = "dist-tags")]
    dist_tags: Option<HashMap<String, String>>,
    time: Option<HashMap<String, String>>,
    description: Option<String>,
    license: Option<NpmLicense>,
    repository: Option<NpmRepository>,
    homepage: Option<String>,
    versions: Option<HashMap<String, NpmVersion>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NpmLicense {
    Plain(String),
    Object { r#type: String },
}

impl NpmLicense {
    fn into_string(self) -> String {
        match self {
            Self::Plain(s) => s,
            Self::Object { r#type } => r#type,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NpmRepository {
    Plain(String),
    Object { url: Option<String> },
}

impl NpmRepository {
    fn into_url(self) -> Option<String> {
        let raw = match self {
            Self::Plain(s) => s,
            Self::Object { url } => url?,
        };
        let cleaned = raw
            .trim_start_matches("git+")
            .trim_end_matches(".git")
            .replace("git://", "https://");
        Some(cleaned)
    }
}

#[derive(Deserialize)]
struct NpmVersion {
    dependencies: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct NpmDownloads {
    downloads: u64,
}

#[derive(Deserialize)]
struct NpmSearchResponse {
    objects: Vec<NpmSearchObject>,
}

#[derive(Deserialize)]
struct NpmSearchObject {
    package: NpmSearchPackage,
}

#[derive(Deserialize)]
struct NpmSearchPackage {
    name: String,
    version: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct PypiPackage {
    info: PypiInfo,
    #[serde(default)]
    urls: Vec<PypiFile>,
}

#[derive(Deserialize)]
struct PypiInfo {
    version: Option<String>,
    summary: Option<String>,
    license: Option<String>,
    home_page: Option<String>,
    // Absent or JSON null both deserialize to None; values may be null too.
    project_urls: Option<HashMap<String, Option<String>>>,
    requires_dist: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct PypiFile {
    upload_time_iso_8601: Option<String>,
}

#[derive(Deserialize)]
struct CratesResponse {
    #[serde(rename = "crate")]
    krate: CratesCrate,
    #[serde(default)]
    versions: Vec<CratesVersion>,
}

#[derive(Deserialize)]
struct CratesCrate {
    max_version: String,
    downloads: u64,
    updated_at: Option<String>,
    repository: Option<String>,
    homepage: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct CratesVersion {
    license: Option<String>,
}

#[derive(Deserialize)]
struct CratesSearchResponse {
    crates: Vec<CratesSearchCrate>,
}

#[derive(Deserialize)]
struct CratesSearchCrate {
    name: String,
    max_version: String,
    description: Option<String>,
}

#[derive(Deserialize)]
struct GoLatest {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Time")]
    time: Option<String>,
}

#[derive(Deserialize)]
struct GitHubRepoSearch {
    #[serde(default)]
    items: Vec<GitHubRepoSearchItem>,
}

#[derive(Deserialize)]
struct GitHubRepoSearchItem {
    full_name: String,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_kind_parses_common_spellings() {
        assert_eq!(RegistryKind::parse("npm"), Some(RegistryKind::Npm));
        assert_eq!(RegistryKind::parse("PyPI"), Some(RegistryKind::PyPi));
        assert_eq!(RegistryKind::parse("crates.io"), Some(RegistryKind::Crates));
        assert_eq!(RegistryKind::parse("golang"), Some(RegistryKind::Go));
        assert_eq!(RegistryKind::parse("maven"), None);
    }

    #[test]
    fn npm_repository_shapes_normalize() {
        let plain = NpmRepository::Plain("git+https://github.com/expressjs/express.git".into());
        assert_eq!(
            plain.into_url().as_deref(),
            Some("https://github.com/expressjs/express")
        );
        let object = NpmRepository::Object {
            url: Some("git://github.com/a/b.git".into()),
        };
        assert_eq!(object.into_url().as_deref(), Some("https://github.com/a/b"));
    }

    #[test]
    fn pypi_null_project_urls_deserialize() {
        let raw = r#"{"info":{"version":"1.0","summary":"s","license":null,
            "home_page":null,"project_urls":null,"requires_dist":null},"urls":[]}"#;
        let doc: PypiPackage = serde_json::from_str(raw).unwrap();
        assert!(doc.info.project_urls.is_none());
    }

    #[test]
    fn pypi_license_is_capped_at_100_chars() {
        let long = "L".repeat(500);
        assert_eq!(truncate_chars(&long, PYPI_LICENSE_MAX_CHARS).chars().count(), 100);
    }

    #[test]
    fn go_module_escaping_marks_capitals() {
        assert_eq!(escape_go_module("github.com/Azure/azure-sdk"), "github.com/!azure/azure-sdk");
        assert_eq!(escape_go_module("golang.org/x/tools"), "golang.org/x/tools");
    }
}
