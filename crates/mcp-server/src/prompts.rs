//! Static prompt templates. Prompts never call upstreams: resolution is
//! pure string interpolation over the supplied arguments.

use rmcp::model::{
    GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
};
use serde_json::Value;

type ArgMap = serde_json::Map<String, Value>;

struct PromptSpec {
    name: &'static str,
    description: &'static str,
    arguments: &'static [(&'static str, &'static str, bool)],
}

const PROMPTS: &[PromptSpec] = &[
    PromptSpec {
        name: "research_package",
        description: "Structured research plan for evaluating a package",
        arguments: &[
            ("package", "Package name to research", true),
            ("registry", "Registry (npm, pypi, crates, go)", false),
        ],
    },
    PromptSpec {
        name: "debug_error",
        description: "Debugging workflow for a pasted error message",
        arguments: &[
            ("error", "The error message to debug", true),
            ("language", "Programming language, if known", false),
            ("framework", "Framework in use, if any", false),
        ],
    },
    PromptSpec {
        name: "compare_technologies",
        description: "Guided comparison of competing technologies",
        arguments: &[
            ("technologies", "Comma-separated list of technologies", true),
            ("category", "framework, library, database, language, or tool", false),
        ],
    },
    PromptSpec {
        name: "evaluate_repository",
        description: "Health evaluation checklist for a repository",
        arguments: &[("repo", "Repository (owner/repo or URL)", true)],
    },
    PromptSpec {
        name: "check_service_health",
        description: "Status sweep across a list of services",
        arguments: &[("services", "Comma-separated list of services", true)],
    },
];

pub fn prompt_list() -> Vec<Prompt> {
    PROMPTS
        .iter()
        .map(|spec| Prompt {
            name: spec.name.to_string(),
            title: None,
            description: Some(spec.description.to_string()),
            arguments: Some(
                spec.arguments
                    .iter()
                    .map(|(name, description, required)| PromptArgument {
                        name: (*name).to_string(),
                        title: None,
                        description: Some((*description).to_string()),
                        required: Some(*required),
                    })
                    .collect(),
            ),
            icons: None,
            meta: None,
        })
        .collect()
}

/// Resolve a prompt into role-tagged messages; `None` for unknown names.
pub fn resolve(name: &str, args: &ArgMap) -> Option<GetPromptResult> {
    let get = |key: &str| -> String {
        args.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string()
    };
    let get_or = |key: &str, fallback: &str| -> String {
        let value = get(key);
        if value.is_empty() {
            fallback.to_string()
        } else {
            value
        }
    };

    let spec = PROMPTS.iter().find(|p| p.name == name)?;
    let text = match name {
        "research_package" => {
            let package = get_or("package", "the package");
            let registry = get_or("registry", "auto");
            format!(
                "Research the package '{package}' (registry: {registry}).\n\
                 1. Use package_info to get version, license, downloads, and repository.\n\
                 2. Use github_repo on its repository to judge maintenance activity.\n\
                 3. Use get_changelog to check for recent breaking changes.\n\
                 4. Summarize: is this package healthy, maintained, and safe to adopt?"
            )
        }
        "debug_error" => {
            let error = get_or("error", "<paste the error here>");
            let language = get("language");
            let framework = get("framework");
            let mut context = String::new();
            if !language.is_empty() {
                context.push_str(&format!(" Language: {language}."));
            }
            if !framework.is_empty() {
                context.push_str(&format!(" Framework: {framework}."));
            }
            format!(
                "Debug this error:{context}\n\n{error}\n\n\
                 1. Use translate_error to classify it and find matching solutions.\n\
                 2. If the error involves an external API, use api_docs on the relevant topic.\n\
                 3. Propose the most likely fix and how to verify it."
            )
        }
        "compare_technologies" => {
            let technologies = get_or("technologies", "the candidates");
            let category = get_or("category", "auto");
            format!(
                "Compare these technologies: {technologies} (category: {category}).\n\
                 1. Use compare_tech for the aspect matrix.\n\
                 2. Use package_info and github_repo on each for hard numbers.\n\
                 3. Recommend one per use case, with the trade-offs made explicit."
            )
        }
        "evaluate_repository" => {
            let repo = get_or("repo", "the repository");
            format!(
                "Evaluate the repository {repo}.\n\
                 1. Use github_repo (with commits) for activity, stars, and open issues/PRs.\n\
                 2. Use get_changelog for release cadence and breaking-change history.\n\
                 3. Verdict: actively maintained, stagnant, or abandoned, and why."
            )
        }
        "check_service_health" => {
            let services = get_or("services", "the services");
            format!(
                "Check the health of these services: {services}.\n\
                 For each, use check_service_status (include_history=true when an incident \
                 is suspected) and report: current state, active incidents, and whether \
                 the outage explains observed symptoms."
            )
        }
        _ => return None,
    };

    Some(GetPromptResult {
        description: Some(spec.description.to_string()),
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_five_prompts_are_listed_and_resolve() {
        let prompts = prompt_list();
        assert_eq!(prompts.len(), 5);
        for prompt in &prompts {
            let result = resolve(&prompt.name, &ArgMap::new()).unwrap();
            assert!(!result.messages.is_empty());
        }
        assert!(resolve("unknown_prompt", &ArgMap::new()).is_none());
    }

    #[test]
    fn arguments_are_interpolated() {
        let mut args = ArgMap::new();
        args.insert("package".into(), Value::String("express".into()));
        args.insert("registry".into(), Value::String("npm".into()));
        let result = resolve("research_package", &args).unwrap();
        let PromptMessage { content, .. } = &result.messages[0];
        let text = serde_json::to_string(content).unwrap();
        assert!(text.contains("express"));
        assert!(text.contains("npm"));
    }
}
