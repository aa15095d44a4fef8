//! Changelog retrieval and classification.
//!
//! Release notes are pulled from the package's repository, classified
//! line-by-line with keyword tables, and rolled into an upgrade-difficulty
//! verdict. Classification is keyword-based and deliberately treated as a
//! hint downstream, never a proof.

use research_clients::github::ReleaseRecord;
use research_clients::{GitHubClient, RegistryClient, RegistryKind};
use research_core::{ResearchError, Result};

/// Case-insensitive markers, checked in this order: breaking beats feature
/// beats fix; unmatched lines are ignored.
const BREAKING_MARKERS: &[&str] = &[
    "breaking change",
    "breaking:",
    "breaking",
    "removed",
    "deprecated",
    "incompatible",
    "migration required",
    "must upgrade",
    "⚠️",
    "🚨",
];
const FEATURE_MARKERS: &[&str] = &["new:", "added:", "feature:", "✨", "🎉", "feat:"];
const FIX_MARKERS: &[&str] = &["fix:", "fixed:", "bugfix:", "bug fix:", "🐛", "patch:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeDifficulty {
    Low,
    Medium,
    High,
}

impl UpgradeDifficulty {
    /// Bucketing: 0 breaking changes → low, 1–2 → medium, 3+ → high.
    pub fn from_breaking_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1..=2 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Recommendation text is a pure function of the bucket.
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Low => "Safe to upgrade: no breaking changes detected in the inspected releases.",
            Self::Medium => {
                "Review the flagged changes before upgrading: a small number of breaking changes were detected."
            }
            Self::High => {
                "Plan this upgrade carefully: multiple breaking changes were detected. Read the release notes and any migration guides first."
            }
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Release {
    pub version: String,
    pub date: Option<String>,
    pub author: Option<String>,
    pub breaking_changes: Vec<String>,
    pub new_features: Vec<String>,
    pub bug_fixes: Vec<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub migration_guide: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChangelogSummary {
    pub total_releases: usize,
    pub breaking_count: usize,
    pub difficulty: UpgradeDifficulty,
    pub recommendation: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Changelog {
    pub package: String,
    pub registry: RegistryKind,
    pub repository: Option<String>,
    pub releases: Vec<Release>,
    pub summary: ChangelogSummary,
}

pub struct ChangelogEngine {
    registry: RegistryClient,
    github: GitHubClient,
}

impl ChangelogEngine {
    pub fn new(registry: RegistryClient, github: GitHubClient) -> Self {
        Self { registry, github }
    }

    /// Full pipeline: registry lookup → repository → releases → classify.
    pub async fn get_changelog(
        &self,
        package: &str,
        registry: Option<RegistryKind>,
        from_version: Option<&str>,
        to_version: Option<&str>,
        max_releases: usize,
    ) -> Result<Changelog> {
        let (info, registry) = match registry {
            Some(kind) => (self.registry.package_info(kind, package).await?, kind),
            None => self.resolve_any_registry(package).await?,
        };

        let repository = info.repository.clone().ok_or_else(|| {
            ResearchError::NotFound(format!("Could not find repository for package '{package}'"))
        })?;
        let (owner, repo) =
            research_clients::github::parse_repo_input(&repository).map_err(|_| {
                ResearchError::NotFound(format!(
                    "Could not find repository for package '{package}' (repository URL '{repository}' is not a GitHub repository)"
                ))
            })?;

        let records = self.github.releases(&owner, &repo, max_releases).await?;
        let mut releases: Vec<Release> = records.into_iter().map(classify_release).collect();
        if from_version.is_some() || to_version.is_some() {
            releases.retain(|r| version_in_range(&r.version, from_version, to_version));
        }
        releases.truncate(max_releases);

        let breaking_count = releases.iter().map(|r| r.breaking_changes.len()).sum();
        let difficulty = UpgradeDifficulty::from_breaking_count(breaking_count);

        Ok(Changelog {
            package: package.to_string(),
            registry,
            repository: Some(repository),
            summary: ChangelogSummary {
                total_releases: releases.len(),
                breaking_count,
                difficulty,
                recommendation: difficulty.recommendation().to_string(),
            },
            releases,
        })
    }

    /// `registry=auto`: try each registry in a fixed order, first hit wins.
    async fn resolve_any_registry(
        &self,
        package: &str,
    ) -> Result<(research_clients::PackageInfo, RegistryKind)> {
        const ORDER: [RegistryKind; 4] = [
            RegistryKind::Npm,
            RegistryKind::PyPi,
            RegistryKind::Crates,
            RegistryKind::Go,
        ];
        let mut last_error = None;
        for kind in ORDER {
            match self.registry.package_info(kind, package).await {
                Ok(info) => return Ok((info, kind)),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            ResearchError::NotFound(format!("Package '{package}' not found in any registry"))
        }))
    }
}

/// Classify one release body line-by-line.
pub fn classify_release(record: ReleaseRecord) -> Release {
    let version = record
        .tag_name
        .or(record.name.clone())
        .unwrap_or_else(|| "unreleased".to_string());
    let body = record.body.unwrap_or_default();

    let mut breaking_changes = Vec::new();
    let mut new_features = Vec::new();
    let mut bug_fixes = Vec::new();
    let mut migration_guide = None;

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let lowered = line.to_lowercase();

        if migration_guide.is_none() && lowered.contains("migration") {
            if let Some(url) = first_url(line) {
                migration_guide = Some(url);
            }
        }

        let stripped = strip_bullet_prefix(line);
        if contains_any(&lowered, BREAKING_MARKERS) {
            breaking_changes.push(stripped);
        } else if contains_any(&lowered, FEATURE_MARKERS) {
            new_features.push(stripped);
        } else if contains_any(&lowered, FIX_MARKERS) {
            bug_fixes.push(stripped);
        }
    }

    let notes = record
        .name
        .filter(|n| !n.trim().is_empty() && *n != version);

    Release {
        version,
        date: record.published_at,
        author: record.author.map(|a| a.login),
        breaking_changes,
        new_features,
        bug_fixes,
        notes,
        url: record.html_url,
        migration_guide,
    }
}

fn contains_any(lowered: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| lowered.contains(m))
}

/// Strip leading bullets and category prefixes ("- ", "* ", "Breaking:",
/// "feat:", …) so the classified line reads as prose.
fn strip_bullet_prefix(line: &str) -> String {
    let mut out = line.trim();
    for bullet in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = out.strip_prefix(bullet) {
            out = rest.trim();
            break;
        }
    }
    const CATEGORY_PREFIXES: &[&str] = &[
        "breaking change:",
        "breaking:",
        "feature:",
        "feat:",
        "added:",
        "new:",
        "bugfix:",
        "bug fix:",
        "fixed:",
        "fix:",
        "patch:",
    ];
    let lowered = out.to_lowercase();
    for prefix in CATEGORY_PREFIXES {
        if lowered.starts_with(prefix) {
            out = out[prefix.len()..].trim_start();
            break;
        }
    }
    out.to_string()
}

fn first_url(line: &str) -> Option<String> {
    let start = line.find("http://").or_else(|| line.find("https://"))?;
    let url: String = line[start..]
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ')' && *c != ']')
        .collect();
    Some(url)
}

/// Lenient version-range check over dotted numeric segments; releases the
/// comparison cannot interpret are kept.
fn version_in_range(version: &str, from: Option<&str>, to: Option<&str>) -> bool {
    let Some(v) = parse_version(version) else {
        return true;
    };
    if let Some(from) = from.and_then(parse_version_str) {
        if v <= from {
            return false;
        }
    }
    if let Some(to) = to.and_then(parse_version_str) {
        if v > to {
            return false;
        }
    }
    true
}

fn parse_version_str(raw: &str) -> Option<Vec<u64>> {
    parse_version(raw)
}

fn parse_version(raw: &str) -> Option<Vec<u64>> {
    let trimmed = raw.trim().trim_start_matches('v').trim_start_matches('V');
    let core = trimmed.split(['-', '+']).next()?;
    let segments: Vec<u64> = core
        .split('.')
        .map(|s| s.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(body: &str) -> ReleaseRecord {
        serde_json::from_value(serde_json::json!({
            "tag_name": "v2.0.0",
            "name": "Big release",
            "body": body,
            "published_at": "2025-01-15T00:00:00Z",
            "html_url": "https://github.com/a/b/releases/v2.0.0",
            "author": {"login": "maintainer"},
        }))
        .unwrap()
    }

    #[test]
    fn three_breaking_lines_bucket_high() {
        let body = "\
- Breaking change: config format replaced
- removed the legacy API
- deprecated the old CLI flags
- feat: shiny new dashboard
- fix: crash on empty input";
        let release = classify_release(record(body));
        assert_eq!(release.breaking_changes.len(), 3);
        assert_eq!(release.new_features.len(), 1);
        assert_eq!(release.bug_fixes.len(), 1);

        let difficulty = UpgradeDifficulty::from_breaking_count(release.breaking_changes.len());
        assert_eq!(difficulty, UpgradeDifficulty::High);
        assert!(difficulty.recommendation().contains("carefully"));
    }

    #[test]
    fn zero_breaking_lines_bucket_low() {
        let release = classify_release(record("- feat: add widgets\n- fix: typo"));
        assert!(release.breaking_changes.is_empty());
        assert_eq!(
            UpgradeDifficulty::from_breaking_count(0),
            UpgradeDifficulty::Low
        );
    }

    #[test]
    fn buckets_are_exact() {
        assert_eq!(UpgradeDifficulty::from_breaking_count(0), UpgradeDifficulty::Low);
        assert_eq!(UpgradeDifficulty::from_breaking_count(1), UpgradeDifficulty::Medium);
        assert_eq!(UpgradeDifficulty::from_breaking_count(2), UpgradeDifficulty::Medium);
        assert_eq!(UpgradeDifficulty::from_breaking_count(3), UpgradeDifficulty::High);
        assert_eq!(UpgradeDifficulty::from_breaking_count(12), UpgradeDifficulty::High);
    }

    #[test]
    fn bullet_and_category_prefixes_are_stripped() {
        assert_eq!(
            strip_bullet_prefix("- Breaking: drop Node 14 support"),
            "drop Node 14 support"
        );
        assert_eq!(strip_bullet_prefix("* feat: new flags"), "new flags");
        assert_eq!(strip_bullet_prefix("plain line"), "plain line");
    }

    #[test]
    fn emoji_markers_classify() {
        let release = classify_release(record("🚨 config rewrite\n✨ theming\n🐛 crash fixed"));
        assert_eq!(release.breaking_changes.len(), 1);
        assert_eq!(release.new_features.len(), 1);
        assert_eq!(release.bug_fixes.len(), 1);
    }

    #[test]
    fn migration_guide_url_is_captured() {
        let release = classify_release(record(
            "See the migration guide: https://example.com/migrate (required)",
        ));
        assert_eq!(
            release.migration_guide.as_deref(),
            Some("https://example.com/migrate")
        );
    }

    #[test]
    fn version_range_filters_releases() {
        assert!(version_in_range("v2.1.0", Some("2.0.0"), Some("3.0.0")));
        assert!(!version_in_range("v2.0.0", Some("2.0.0"), None));
        assert!(!version_in_range("3.1.0", None, Some("3.0.0")));
        // Unparseable versions are kept.
        assert!(version_in_range("nightly", Some("1.0.0"), None));
    }
}
