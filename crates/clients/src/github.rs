//! GitHub REST adapter: repository metadata, commits, and releases.

use regex::Regex;
use serde::Deserialize;

use research_core::timefmt::format_time_ago;
use research_core::{Config, ResearchError, Result};

use crate::http;

const API_BASE: &str = "https://api.github.com";
const COMMIT_MESSAGE_MAX_CHARS: usize = 80;
const COMMIT_SHA_CHARS: usize = 8;
pub const MAX_RECENT_COMMITS: usize = 3;
pub const MAX_RELEASES: usize = 50;

/// Repository metadata, normalized from the REST shape.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    /// Via the search API; `None` when that sub-query failed.
    pub open_prs: Option<u64>,
    pub language: Option<String>,
    pub license: Option<String>,
    /// Relative form ("3h ago").
    pub last_updated: String,
    pub topics: Vec<String>,
    pub homepage: Option<String>,
    pub archived: bool,
    pub size_kb: u64,
    pub recent_commits: Vec<Commit>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Commit {
    /// Short (8-char) SHA.
    pub sha: String,
    /// First line only, capped at 80 characters.
    pub message: String,
    pub author: String,
    /// Relative form ("2d ago").
    pub date: String,
    pub url: String,
}

/// Raw release payload handed to the changelog engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseRecord {
    pub tag_name: Option<String>,
    pub name: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<String>,
    pub html_url: Option<String>,
    pub author: Option<ReleaseAuthor>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAuthor {
    pub login: String,
}

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http::build_client(config, config.repo_timeout),
            token: config.github_token.clone(),
        }
    }

    /// Fetch repository metadata, following renames.
    ///
    /// The repos endpoint answers renames with a 301 to the new location;
    /// the shared client follows it, and the returned `full_name` reflects
    /// the repository's current home.
    pub async fn repo_info(&self, owner: &str, repo: &str, include_commits: bool) -> Result<RepoInfo> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}");
        let doc: GitHubRepo = self.get_json(&url).await.map_err(|e| match e {
            ResearchError::NotFound(_) => {
                ResearchError::NotFound(format!("Repository '{owner}/{repo}' not found on GitHub"))
            }
            other => other,
        })?;

        // Redirects may have landed us on a renamed repo; keep using the
        // canonical owner/name for the follow-up queries.
        let (owner, repo) = doc
            .full_name
            .split_once('/')
            .map(|(o, r)| (o.to_string(), r.to_string()))
            .unwrap_or((owner.to_string(), repo.to_string()));

        let open_prs = self.open_pr_count(&owner, &repo).await;
        let recent_commits = if include_commits {
            self.recent_commits(&owner, &repo, MAX_RECENT_COMMITS)
                .await
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(RepoInfo {
            full_name: doc.full_name,
            description: doc
                .description
                .unwrap_or_else(|| "No description available".to_string()),
            stars: doc.stargazers_count,
            forks: doc.forks_count,
            watchers: doc.watchers_count,
            open_issues: doc.open_issues_count,
            open_prs,
            language: doc.language,
            license: doc.license.and_then(|l| l.name),
            last_updated: doc
                .updated_at
                .map(|iso| format_time_ago(&iso))
                .unwrap_or_else(|| "unknown".to_string()),
            topics: doc.topics,
            homepage: doc.homepage.filter(|h| !h.is_empty()),
            archived: doc.archived,
            size_kb: doc.size,
            recent_commits,
        })
    }

    /// Fetch the `count` most recent commits (capped at [`MAX_RECENT_COMMITS`]).
    pub async fn recent_commits(&self, owner: &str, repo: &str, count: usize) -> Result<Vec<Commit>> {
        let count = count.clamp(1, MAX_RECENT_COMMITS);
        let url = format!("{API_BASE}/repos/{owner}/{repo}/commits?per_page={count}");
        let docs: Vec<GitHubCommit> = self.get_json(&url).await?;

        Ok(docs
            .into_iter()
            .take(count)
            .map(|c| {
                let inner = c.commit.unwrap_or_default();
                let author = inner.author.unwrap_or_default();
                Commit {
                    sha: c.sha.chars().take(COMMIT_SHA_CHARS).collect(),
                    message: condense_commit_message(
                        inner.message.as_deref().unwrap_or("No message"),
                    ),
                    author: author.name.unwrap_or_else(|| "Unknown".to_string()),
                    date: author
                        .date
                        .map(|iso| format_time_ago(&iso))
                        .unwrap_or_else(|| "unknown".to_string()),
                    url: c.html_url.unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Fetch up to `max_releases` releases, newest first, skipping drafts.
    pub async fn releases(
        &self,
        owner: &str,
        repo: &str,
        max_releases: usize,
    ) -> Result<Vec<ReleaseRecord>> {
        let per_page = max_releases.clamp(1, MAX_RELEASES);
        let url = format!("{API_BASE}/repos/{owner}/{repo}/releases?per_page={per_page}");
        let docs: Vec<ReleaseRecord> = self.get_json(&url).await?;
        Ok(docs
            .into_iter()
            .filter(|r| !r.draft)
            .take(max_releases)
            .collect())
    }

    /// Best-scored repository for a free-text query, used by the comparator
    /// to guess a technology's home repo.
    pub async fn search_top_repo(&self, query: &str) -> Result<Option<(String, u64)>> {
        let url = format!(
            "{API_BASE}/search/repositories?q={}&sort=stars&order=desc&per_page=1",
            urlencoding::encode(query)
        );
        let doc: GitHubSearch<GitHubSearchRepo> = self.get_json(&url).await?;
        Ok(doc
            .items
            .into_iter()
            .next()
            .map(|item| (item.full_name, item.stargazers_count)))
    }

    /// Open PR count via the search API, which counts accurately where the
    /// pulls endpoint would need pagination. Failures collapse to `None`.
    async fn open_pr_count(&self, owner: &str, repo: &str) -> Option<u64> {
        let query = format!("repo:{owner}/{repo} type:pr state:open");
        let url = format!(
            "{API_BASE}/search/issues?q={}&per_page=1",
            urlencoding::encode(&query)
        );
        let doc: GitHubSearchCount = self.get_json(&url).await.ok()?;
        Some(doc.total_count)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GitHub GET {url}");
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }
        let response = request
            .send()
            .await
            .map_err(|e| ResearchError::from_reqwest("GitHub", e))?
            .error_for_status()
            .map_err(|e| ResearchError::from_reqwest("GitHub", e))?;
        response
            .json()
            .await
            .map_err(|_| ResearchError::UpstreamMalformed {
                upstream: "GitHub".into(),
                excerpt: format!("{url} did not return the expected JSON shape"),
            })
    }
}

fn condense_commit_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("No message");
    if first_line.chars().count() > COMMIT_MESSAGE_MAX_CHARS {
        let mut out: String = first_line
            .chars()
            .take(COMMIT_MESSAGE_MAX_CHARS - 3)
            .collect();
        out.push_str("...");
        out
    } else {
        first_line.to_string()
    }
}

// ============================================================================
// Input normalization
// ============================================================================

/// Parse repository input into `(owner, repo)`.
///
/// Accepted shapes: `owner/repo`, `https://github.com/owner/repo`, and the
/// same with a `.git` suffix or trailing path. GitHub search/explore/user
/// URLs are rejected with targeted messages.
pub fn parse_repo_input(input: &str) -> Result<(String, String)> {
    let input = input.trim().trim_end_matches('/');
    if input.is_empty() {
        return Err(ResearchError::InputInvalid(
            "Repository input is empty. Use 'owner/repo' or a GitHub URL.".into(),
        ));
    }

    if input.starts_with("https://") || input.starts_with("http://") {
        return parse_repo_url(input);
    }

    let name_pattern = Regex::new(r"^[A-Za-z0-9_.-]+$").expect("static regex");
    if let Some((owner, repo)) = input.split_once('/') {
        let (owner, repo) = (owner.trim(), repo.trim().trim_end_matches(".git"));
        if !owner.is_empty()
            && !repo.is_empty()
            && name_pattern.is_match(owner)
            && name_pattern.is_match(repo)
        {
            return Ok((owner.to_string(), repo.to_string()));
        }
    }

    Err(ResearchError::InputInvalid(format!(
        "Invalid repository format: '{input}'. Use 'owner/repo' (e.g. 'tokio-rs/tokio') or a full GitHub URL."
    )))
}

fn parse_repo_url(input: &str) -> Result<(String, String)> {
    let lowered = input.to_ascii_lowercase();
    if !lowered.contains("github.com") {
        return Err(ResearchError::InputInvalid(format!(
            "Not a GitHub URL: '{input}'. Provide a GitHub repository URL or use 'owner/repo'."
        )));
    }

    const NON_REPO_PAGES: &[&str] = &[
        "search",
        "explore",
        "topics",
        "trending",
        "settings",
        "notifications",
        "new",
        "organizations",
        "marketplace",
    ];

    let repo_pattern = Regex::new(
        r"^https?://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git|/.*)?$",
    )
    .expect("static regex");
    let user_pattern =
        Regex::new(r"^https?://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)$").expect("static regex");

    if let Some(first_segment) = lowered
        .split("github.com/")
        .nth(1)
        .and_then(|rest| rest.split(['/', '?']).next())
    {
        if NON_REPO_PAGES.contains(&first_segment) {
            return Err(ResearchError::InputInvalid(format!(
                "Invalid GitHub URL: '{input}'. This is a GitHub {first_segment} page, not a repository. Provide a URL like 'https://github.com/owner/repo'."
            )));
        }
    }

    if let Some(caps) = repo_pattern.captures(input) {
        let owner = caps[1].to_string();
        let repo = caps[2].to_string();
        if !owner.is_empty() && !repo.is_empty() {
            return Ok((owner, repo));
        }
    }

    if let Some(caps) = user_pattern.captures(input) {
        return Err(ResearchError::InputInvalid(format!(
            "Invalid GitHub URL: '{input}'. This is a user/organization page; provide a repository like 'https://github.com/{}/repo-name'.",
            &caps[1]
        )));
    }

    Err(ResearchError::InputInvalid(format!(
        "Could not parse GitHub URL: '{input}'. Use 'https://github.com/owner/repo'."
    )))
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Deserialize)]
struct GitHubRepo {
    full_name: String,
    description: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    watchers_count: u64,
    open_issues_count: u64,
    language: Option<String>,
    license: Option<GitHubLicense>,
    updated_at: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    homepage: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct GitHubLicense {
    name: Option<String>,
}

#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    html_url: Option<String>,
    commit: Option<GitHubCommitInner>,
}

#[derive(Deserialize, Default)]
struct GitHubCommitInner {
    message: Option<String>,
    author: Option<GitHubCommitAuthor>,
}

#[derive(Deserialize, Default)]
struct GitHubCommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct GitHubSearch<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Deserialize, Default)]
struct GitHubSearchRepo {
    full_name: String,
    stargazers_count: u64,
}

#[derive(Deserialize)]
struct GitHubSearchCount {
    total_count: u64,
}
