//! Technology comparison: parallel per-technology gathering aggregated into
//! an aspect matrix.
//!
//! Each technology fans out concurrently to the package registries, a
//! repository guess, and one meta-search per aspect. A technology is allowed
//! to partially fail; its missing cells read "Information not found" and the
//! call as a whole still succeeds.

use std::collections::BTreeMap;

use futures::future::join_all;

use research_clients::{GitHubClient, RegistryClient, RegistryKind, SearchClient};
use research_core::Result;

pub const MIN_TECHNOLOGIES: usize = 2;
pub const MAX_TECHNOLOGIES: usize = 5;
const NOT_FOUND_CELL: &str = "Information not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    Framework,
    Library,
    Database,
    Language,
    Tool,
}

impl TechCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "framework" => Some(Self::Framework),
            "library" => Some(Self::Library),
            "database" => Some(Self::Database),
            "language" => Some(Self::Language),
            "tool" => Some(Self::Tool),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::Library => "library",
            Self::Database => "database",
            Self::Language => "language",
            Self::Tool => "tool",
        }
    }

    /// Default aspect list per category.
    pub fn default_aspects(self) -> &'static [&'static str] {
        match self {
            Self::Framework => &[
                "performance",
                "learning_curve",
                "ecosystem",
                "popularity",
                "features",
            ],
            Self::Library => &[
                "performance",
                "features",
                "ecosystem",
                "popularity",
                "bundle_size",
            ],
            Self::Database => &[
                "performance",
                "data_model",
                "scaling",
                "use_cases",
                "ecosystem",
            ],
            Self::Language => &[
                "performance",
                "learning_curve",
                "ecosystem",
                "jobs",
                "use_cases",
            ],
            Self::Tool => &["performance", "features", "configuration", "ecosystem"],
        }
    }
}

/// Infer a category from well-known technology names; defaults to
/// `Framework` when nothing matches.
pub fn detect_category(technologies: &[String]) -> TechCategory {
    const DATABASES: &[&str] = &[
        "postgres", "postgresql", "mysql", "sqlite", "mongodb", "redis", "cassandra",
        "dynamodb", "couchdb", "mariadb", "clickhouse", "cockroachdb", "neo4j",
    ];
    const LANGUAGES: &[&str] = &[
        "rust", "go", "golang", "python", "javascript", "typescript", "java", "kotlin",
        "swift", "ruby", "php", "elixir", "zig", "scala", "haskell",
    ];
    const TOOLS: &[&str] = &[
        "webpack", "vite", "esbuild", "docker", "kubernetes", "terraform", "ansible",
        "git", "jenkins", "babel", "eslint", "prettier",
    ];
    const FRAMEWORKS: &[&str] = &[
        "react", "vue", "angular", "svelte", "django", "flask", "fastapi", "rails",
        "laravel", "spring", "express", "next.js", "nextjs", "nuxt", "actix", "axum",
    ];

    let lowered: Vec<String> = technologies.iter().map(|t| t.to_lowercase()).collect();
    let count_in = |names: &[&str]| {
        lowered
            .iter()
            .filter(|t| names.contains(&t.as_str()))
            .count()
    };

    let scores = [
        (TechCategory::Database, count_in(DATABASES)),
        (TechCategory::Language, count_in(LANGUAGES)),
        (TechCategory::Tool, count_in(TOOLS)),
        (TechCategory::Framework, count_in(FRAMEWORKS)),
    ];
    scores
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)
        .map(|(category, _)| category)
        .unwrap_or(TechCategory::Framework)
}

/// Per-technology gathering result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TechProfile {
    pub name: String,
    pub registry_summary: Option<String>,
    pub repo_summary: Option<String>,
    pub aspect_values: BTreeMap<String, String>,
    pub best_for: Option<String>,
    pub sources: Vec<String>,
}

/// Aggregated comparison output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ComparisonMatrix {
    pub technologies: Vec<String>,
    pub category: TechCategory,
    /// aspect → (technology → extracted value).
    pub aspects: BTreeMap<String, BTreeMap<String, String>>,
    /// technology → best-for sentence.
    pub summary: BTreeMap<String, String>,
    pub sources: Vec<String>,
}

pub struct Comparator {
    search: SearchClient,
    github: GitHubClient,
    registry: RegistryClient,
}

impl Comparator {
    pub fn new(search: SearchClient, github: GitHubClient, registry: RegistryClient) -> Self {
        Self {
            search,
            github,
            registry,
        }
    }

    /// Compare 2–5 technologies over the selected aspects.
    pub async fn compare(
        &self,
        technologies: &[String],
        category: Option<TechCategory>,
        aspects: Option<Vec<String>>,
        max_results_per_tech: usize,
    ) -> Result<ComparisonMatrix> {
        let category = category.unwrap_or_else(|| detect_category(technologies));
        let aspects: Vec<String> = aspects
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| {
                category
                    .default_aspects()
                    .iter()
                    .map(|a| a.to_string())
                    .collect()
            });

        // One concurrent sub-task per technology; each is allowed to fail
        // partially without sinking the whole comparison.
        let profiles = join_all(technologies.iter().map(|tech| {
            self.gather_tech(tech.clone(), &aspects, max_results_per_tech)
        }))
        .await;

        let mut matrix: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut summary = BTreeMap::new();
        let mut sources = Vec::new();
        for aspect in &aspects {
            matrix.insert(aspect.clone(), BTreeMap::new());
        }

        for profile in profiles {
            for aspect in &aspects {
                let value = profile
                    .aspect_values
                    .get(aspect)
                    .cloned()
                    .unwrap_or_else(|| NOT_FOUND_CELL.to_string());
                if let Some(row) = matrix.get_mut(aspect) {
                    row.insert(profile.name.clone(), value);
                }
            }
            let mut summary_parts = Vec::new();
            if let Some(best) = &profile.best_for {
                summary_parts.push(best.clone());
            }
            if let Some(repo) = &profile.repo_summary {
                summary_parts.push(repo.clone());
            }
            if let Some(registry) = &profile.registry_summary {
                summary_parts.push(registry.clone());
            }
            let summary_text = if summary_parts.is_empty() {
                NOT_FOUND_CELL.to_string()
            } else {
                summary_parts.join("; ")
            };
            summary.insert(profile.name.clone(), summary_text);
            sources.extend(profile.sources);
        }
        sources.dedup();

        Ok(ComparisonMatrix {
            technologies: technologies.to_vec(),
            category,
            aspects: matrix,
            summary,
            sources,
        })
    }

    /// Gather one technology: registry + repo guess + per-aspect searches,
    /// all concurrently.
    async fn gather_tech(
        &self,
        tech: String,
        aspects: &[String],
        max_results: usize,
    ) -> TechProfile {
        let registry_fut = self.lookup_any_registry(&tech);
        let repo_fut = self.github.search_top_repo(&tech);
        let best_for_query = format!("{tech} best use cases");
        let best_for_fut = self
            .search
            .search(&best_for_query, "it", max_results.max(1), None);
        let aspect_queries: Vec<String> = aspects
            .iter()
            .map(|aspect| format!("{tech} {}", aspect.replace('_', " ")))
            .collect();
        let aspect_futs = join_all(
            aspect_queries
                .iter()
                .map(|query| self.search.search(query, "it", max_results.max(1), None)),
        );

        let (registry_outcome, repo_outcome, best_for_outcome, aspect_outcomes) =
            tokio::join!(registry_fut, repo_fut, best_for_fut, aspect_futs);

        let mut sources = Vec::new();

        let registry_summary = registry_outcome.map(|info| {
            let downloads = info
                .downloads
                .as_deref()
                .map(|d| format!(", {d} downloads"))
                .unwrap_or_default();
            format!(
                "{} {} on {}{downloads}",
                info.name,
                info.version,
                info.registry.label()
            )
        });

        let repo_summary = match repo_outcome {
            Ok(Some((full_name, stars))) => {
                sources.push(format!("https://github.com/{full_name}"));
                Some(format!(
                    "{full_name} ({} stars)",
                    research_core::timefmt::format_count(stars)
                ))
            }
            _ => None,
        };

        let mut aspect_values = BTreeMap::new();
        for (aspect, outcome) in aspects.iter().zip(aspect_outcomes) {
            if let Ok(hits) = outcome {
                let keyword = aspect.replace('_', " ");
                if let Some((value, url)) = extract_aspect_sentence(&hits, &keyword) {
                    aspect_values.insert(aspect.clone(), value);
                    sources.push(url);
                }
            }
        }

        let best_for = best_for_outcome.ok().and_then(|hits| {
            hits.iter()
                .find(|h| !h.snippet.is_empty())
                .map(|h| {
                    sources.push(h.url.clone());
                    first_sentence(&h.snippet)
                })
        });

        TechProfile {
            name: tech,
            registry_summary,
            repo_summary,
            aspect_values,
            best_for,
            sources,
        }
    }

    async fn lookup_any_registry(&self, tech: &str) -> Option<research_clients::PackageInfo> {
        const ORDER: [RegistryKind; 3] =
            [RegistryKind::Npm, RegistryKind::PyPi, RegistryKind::Crates];
        for kind in ORDER {
            if let Ok(info) = self.registry.package_info(kind, tech).await {
                return Some(info);
            }
        }
        None
    }
}

/// First sentence across the hits that mentions the aspect keyword, with
/// the hit URL it came from.
fn extract_aspect_sentence(
    hits: &[research_clients::SearchHit],
    keyword: &str,
) -> Option<(String, String)> {
    let keyword = keyword.to_lowercase();
    // Single-word fallback so "learning curve" also matches "learning".
    let first_word = keyword.split(' ').next().unwrap_or(&keyword).to_string();

    for needle in [keyword, first_word] {
        for hit in hits {
            for source in [&hit.snippet, &hit.title] {
                for sentence in split_sentences(source) {
                    if sentence.to_lowercase().contains(&needle) {
                        return Some((sentence, hit.url.clone()));
                    }
                }
            }
        }
    }
    None
}

fn split_sentences(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(['.', '!', '?'])
        .map(|s| s.trim().to_string())
        .filter(|s| s.len() > 10)
}

fn first_sentence(text: &str) -> String {
    split_sentences(text)
        .next()
        .unwrap_or_else(|| text.trim().to_string())
}
