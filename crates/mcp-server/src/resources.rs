//! URI-templated resources, resolved through the same clients the tools
//! use and returned as JSON documents.

use std::sync::Arc;

use rmcp::model::{RawResourceTemplate, ResourceTemplate};

use research_clients::github::parse_repo_input;
use research_clients::RegistryKind;
use research_core::{ResearchError, Result};

use crate::state::AppState;

struct TemplateSpec {
    uri_template: &'static str,
    name: &'static str,
    description: &'static str,
}

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec {
        uri_template: "package://{registry}/{name}",
        name: "package",
        description: "Package metadata from npm, PyPI, crates.io, or the Go proxy",
    },
    TemplateSpec {
        uri_template: "github://{owner}/{repo}",
        name: "github-repo",
        description: "GitHub repository metadata with recent commits",
    },
    TemplateSpec {
        uri_template: "status://{service}",
        name: "service-status",
        description: "Normalized service status from the service's status page",
    },
    TemplateSpec {
        uri_template: "changelog://{registry}/{package}",
        name: "changelog",
        description: "Classified release notes with upgrade difficulty",
    },
];

pub fn resource_templates() -> Vec<ResourceTemplate> {
    TEMPLATES
        .iter()
        .map(|spec| ResourceTemplate {
            raw: RawResourceTemplate {
                uri_template: spec.uri_template.to_string(),
                name: spec.name.to_string(),
                title: None,
                description: Some(spec.description.to_string()),
                mime_type: Some("application/json".to_string()),
                icons: None,
            },
            annotations: None,
        })
        .collect()
}

/// Resolve a resource URI into a JSON document.
pub async fn resolve(state: &Arc<AppState>, uri: &str) -> Result<String> {
    let (scheme, rest) = uri.split_once("://").ok_or_else(|| {
        ResearchError::InputInvalid(format!("Unrecognized resource URI '{uri}'"))
    })?;

    match scheme {
        "package" => {
            let (registry, name) = split_two(rest, uri)?;
            let registry = parse_registry(&registry)?;
            let info = state.registry.package_info(registry, &name).await?;
            to_json(&info)
        }
        "github" => {
            // Reuse the repo-input validator so malformed owner/repo pairs
            // fail the same way the tool does.
            let (owner, repo) = parse_repo_input(rest)?;
            let info = state.github.repo_info(&owner, &repo, true).await?;
            to_json(&info)
        }
        "status" => {
            if rest.is_empty() || rest.contains('/') {
                return Err(ResearchError::InputInvalid(format!(
                    "Expected status://{{service}}, got '{uri}'"
                )));
            }
            let status = state.status.check_service(rest, false, 7).await?;
            to_json(&status)
        }
        "changelog" => {
            let (registry, package) = split_two(rest, uri)?;
            let registry = if registry == "auto" {
                None
            } else {
                Some(parse_registry(&registry)?)
            };
            let changelog = state
                .changelog
                .get_changelog(&package, registry, None, None, 10)
                .await?;
            to_json(&changelog)
        }
        other => Err(ResearchError::InputInvalid(format!(
            "Unknown resource scheme '{other}'"
        ))),
    }
}

fn split_two(rest: &str, uri: &str) -> Result<(String, String)> {
    match rest.split_once('/') {
        Some((first, second)) if !first.is_empty() && !second.is_empty() => {
            Ok((first.to_string(), second.to_string()))
        }
        _ => Err(ResearchError::InputInvalid(format!(
            "Expected two path segments in resource URI '{uri}'"
        ))),
    }
}

fn parse_registry(raw: &str) -> Result<RegistryKind> {
    RegistryKind::parse(raw).ok_or_else(|| {
        ResearchError::InputInvalid(format!("Unknown registry '{raw}' in resource URI"))
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ResearchError::Internal(format!("resource serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_cover_all_four_schemes() {
        let templates = resource_templates();
        let uris: Vec<&str> = templates
            .iter()
            .map(|t| t.raw.uri_template.as_str())
            .collect();
        assert_eq!(
            uris,
            vec![
                "package://{registry}/{name}",
                "github://{owner}/{repo}",
                "status://{service}",
                "changelog://{registry}/{package}",
            ]
        );
        assert!(templates
            .iter()
            .all(|t| t.raw.mime_type.as_deref() == Some("application/json")));
    }

    #[test]
    fn split_two_requires_both_segments() {
        assert!(split_two("npm/express", "package://npm/express").is_ok());
        assert!(split_two("npm", "package://npm").is_err());
        assert!(split_two("/x", "package:///x").is_err());
    }
}
