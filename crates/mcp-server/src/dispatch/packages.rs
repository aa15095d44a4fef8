//! Handlers for `package_info` and `package_search`.

use std::sync::Arc;

use research_clients::{PackageInfo, RegistryKind};
use research_core::{ResearchError, Result};

use super::args::{enum_or, int_in_range, require_str, Args};
use crate::state::AppState;

const REGISTRIES: &[&str] = &["npm", "pypi", "crates", "go"];

pub async fn package_info(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let name = require_str(args, "name")?;
    let registry = parse_registry(&require_str(args, "registry")?)?;

    let info = state.registry.package_info(registry, &name).await?;
    Ok(format_package_info(&info))
}

pub async fn package_search(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let query = require_str(args, "query")?;
    let registry = parse_registry(&enum_or(args, "registry", REGISTRIES, "npm")?)?;
    let max_results = int_in_range(args, "max_results", 1, 20, 10)? as usize;

    let hits = state
        .registry
        .package_search(registry, &query, max_results)
        .await?;
    if hits.is_empty() {
        return Ok(format!(
            "No packages matching '{query}' on {}.",
            registry.label()
        ));
    }

    let mut lines = Vec::with_capacity(hits.len() + 1);
    let qualifier = match registry {
        // Candidates only: derived from repository search, not the registry.
        RegistryKind::PyPi | RegistryKind::Go => " (candidates from GitHub repository search)",
        _ => "",
    };
    lines.push(format!(
        "Packages matching '{query}' on {}{qualifier}:",
        registry.label()
    ));
    for (idx, hit) in hits.iter().enumerate() {
        let version = hit
            .version
            .as_deref()
            .map(|v| format!(" v{v}"))
            .unwrap_or_default();
        let description = hit
            .description
            .as_deref()
            .map(|d| format!("\n   {d}"))
            .unwrap_or_default();
        lines.push(format!("{}. {}{version}{description}", idx + 1, hit.name));
    }
    Ok(lines.join("\n"))
}

fn parse_registry(raw: &str) -> Result<RegistryKind> {
    RegistryKind::parse(raw).ok_or_else(|| {
        ResearchError::InputInvalid(format!(
            "Parameter 'registry' must be one of {REGISTRIES:?} (got '{raw}')"
        ))
    })
}

fn format_package_info(info: &PackageInfo) -> String {
    let mut lines = vec![
        format!("# {} ({})", info.name, info.registry.label()),
        format!("Version: {}", info.version),
    ];
    if !info.description.is_empty() {
        lines.push(format!("Description: {}", info.description));
    }
    if let Some(license) = &info.license {
        lines.push(format!("License: {license}"));
    }
    if let Some(downloads) = &info.downloads {
        lines.push(format!("Downloads: {downloads}"));
    }
    lines.push(format!("Last updated: {}", info.last_updated));
    if let Some(count) = info.dependencies_count {
        lines.push(format!("Dependencies: {count}"));
    }
    if let Some(repository) = &info.repository {
        lines.push(format!("Repository: {repository}"));
    }
    if let Some(homepage) = &info.homepage {
        lines.push(format!("Homepage: {homepage}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_info_text_carries_the_key_fields() {
        let info = PackageInfo {
            name: "express".into(),
            registry: RegistryKind::Npm,
            version: "4.19.2".into(),
            description: "Fast, unopinionated, minimalist web framework".into(),
            license: Some("MIT".into()),
            downloads: Some("50.3M/week".into()),
            last_updated: "3d ago".into(),
            repository: Some("https://github.com/expressjs/express".into()),
            dependencies_count: Some(31),
            homepage: Some("https://expressjs.com".into()),
        };
        let text = format_package_info(&info);
        assert!(text.contains("express"));
        assert!(text.contains("MIT"));
        assert!(text.contains("50.3M"));
        assert!(text.contains("github.com/expressjs/express"));
        assert!(text.contains("ago"));
    }

    #[test]
    fn registry_parse_errors_are_descriptive() {
        let err = parse_registry("maven").unwrap_err();
        assert!(err.to_string().contains("registry"));
    }
}
