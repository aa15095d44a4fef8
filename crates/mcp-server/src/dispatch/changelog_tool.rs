//! Handler for `get_changelog`.

use std::sync::Arc;

use research_clients::RegistryKind;
use research_core::Result;
use research_pipelines::Changelog;

use super::args::{enum_or, int_in_range, opt_str, require_str, Args};
use crate::state::AppState;

const REGISTRIES: &[&str] = &["npm", "pypi", "crates", "go", "auto"];

pub async fn get_changelog(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let package = require_str(args, "package")?;
    let registry = match enum_or(args, "registry", REGISTRIES, "auto")?.as_str() {
        "auto" => None,
        other => RegistryKind::parse(other),
    };
    let from_version = opt_str(args, "from_version")?;
    let to_version = opt_str(args, "to_version")?;
    let max_releases = int_in_range(args, "max_releases", 1, 50, 10)? as usize;

    let changelog = state
        .changelog
        .get_changelog(
            &package,
            registry,
            from_version.as_deref(),
            to_version.as_deref(),
            max_releases,
        )
        .await?;
    Ok(format_changelog(&changelog))
}

fn format_changelog(changelog: &Changelog) -> String {
    let mut lines = vec![format!(
        "# Changelog: {} ({})",
        changelog.package,
        changelog.registry.label()
    )];
    if let Some(repository) = &changelog.repository {
        lines.push(format!("Repository: {repository}"));
    }
    lines.push(format!(
        "Releases inspected: {}  Breaking changes: {}  Upgrade difficulty: {}",
        changelog.summary.total_releases,
        changelog.summary.breaking_count,
        changelog.summary.difficulty.as_str()
    ));
    lines.push(changelog.summary.recommendation.clone());

    for release in &changelog.releases {
        lines.push(String::new());
        let date = release
            .date
            .as_deref()
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        lines.push(format!("## {}{date}", release.version));
        if !release.breaking_changes.is_empty() {
            lines.push("Breaking:".to_string());
            for change in &release.breaking_changes {
                lines.push(format!("- {change}"));
            }
        }
        if !release.new_features.is_empty() {
            lines.push("Features:".to_string());
            for feature in &release.new_features {
                lines.push(format!("- {feature}"));
            }
        }
        if !release.bug_fixes.is_empty() {
            lines.push("Fixes:".to_string());
            for fix in &release.bug_fixes {
                lines.push(format!("- {fix}"));
            }
        }
        if let Some(guide) = &release.migration_guide {
            lines.push(format!("Migration guide: {guide}"));
        }
        if let Some(url) = &release.url {
            lines.push(format!("Notes: {url}"));
        }
    }

    lines.join("\n")
}
