//! The tool catalog: one descriptor per tool plus its JSON input schema.
//!
//! This table is the registry the dispatcher iterates; the MCP `tools/list`
//! reply and the `--print-tools` inventory are both derived from it.
//! Parameter names, ranges, defaults, and enum sets are part of the
//! external contract.

use serde_json::{json, Value};

#[derive(Clone, Copy, Debug)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub summary: &'static str,
}

pub const TOOL_CATALOG: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "web_search",
        summary: "Meta-search the web via the local SearXNG instance.",
    },
    ToolDescriptor {
        name: "search_examples",
        summary: "Find code examples and tutorials (site-targeted search).",
    },
    ToolDescriptor {
        name: "search_images",
        summary: "Search stock images on Pixabay with filters.",
    },
    ToolDescriptor {
        name: "crawl_url",
        summary: "Render a URL to readable markdown with a size cap.",
    },
    ToolDescriptor {
        name: "package_info",
        summary: "Look up a package on npm, PyPI, crates.io, or the Go proxy.",
    },
    ToolDescriptor {
        name: "package_search",
        summary: "Discover packages in a registry by free-text query.",
    },
    ToolDescriptor {
        name: "github_repo",
        summary: "Fetch GitHub repository metadata, optionally with commits.",
    },
    ToolDescriptor {
        name: "translate_error",
        summary: "Parse an error message and find matching solutions.",
    },
    ToolDescriptor {
        name: "api_docs",
        summary: "Locate official API docs and extract a topic's details.",
    },
    ToolDescriptor {
        name: "extract_data",
        summary: "Extract tables, lists, fields, or JSON-LD from a page.",
    },
    ToolDescriptor {
        name: "compare_tech",
        summary: "Compare 2-5 technologies across category-specific aspects.",
    },
    ToolDescriptor {
        name: "get_changelog",
        summary: "Retrieve release notes with breaking-change classification.",
    },
    ToolDescriptor {
        name: "check_service_status",
        summary: "Probe a service's status page and normalize its state.",
    },
];

fn reasoning_prop() -> Value {
    json!({
        "type": "string",
        "description": "Why you're using this tool (required for analytics)"
    })
}

fn max_results_prop(min: u64, max: u64, default: u64) -> Value {
    json!({
        "type": "integer",
        "minimum": min,
        "maximum": max,
        "default": default,
        "description": format!("How many results to return ({min}-{max})")
    })
}

/// JSON input schema for one tool; panics on unknown names, which only a
/// catalog/dispatch mismatch can cause.
pub fn input_schema(name: &str) -> Value {
    match name {
        "web_search" => json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Natural-language web query" },
                "reasoning": reasoning_prop(),
                "category": {
                    "type": "string",
                    "enum": ["general", "it", "news", "science", "videos", "images", "files"],
                    "default": "general",
                },
                "max_results": max_results_prop(1, 10, 5),
            },
            "required": ["query", "reasoning"]
        }),
        "search_examples" => json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "What to find examples of" },
                "reasoning": reasoning_prop(),
                "content_type": {
                    "type": "string",
                    "enum": ["code", "articles", "both"],
                    "default": "both",
                },
                "time_range": {
                    "type": "string",
                    "enum": ["day", "week", "month", "year", "all"],
                    "default": "all",
                },
                "max_results": max_results_prop(1, 10, 5),
            },
            "required": ["query", "reasoning"]
        }),
        "search_images" => json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Image search query" },
                "reasoning": reasoning_prop(),
                "image_type": {
                    "type": "string",
                    "enum": ["all", "photo", "illustration", "vector"],
                    "default": "all",
                },
                "orientation": {
                    "type": "string",
                    "enum": ["all", "horizontal", "vertical"],
                    "default": "all",
                },
                "max_results": max_results_prop(1, 20, 10),
            },
            "required": ["query", "reasoning"]
        }),
        "crawl_url" => json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "URL to fetch and render" },
                "reasoning": reasoning_prop(),
                "max_chars": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50000,
                    "default": 8000,
                },
            },
            "required": ["url", "reasoning"]
        }),
        "package_info" => json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Package name (or Go module path)" },
                "registry": {
                    "type": "string",
                    "enum": ["npm", "pypi", "crates", "go"],
                },
                "reasoning": reasoning_prop(),
            },
            "required": ["name", "registry", "reasoning"]
        }),
        "package_search" => json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Free-text package query" },
                "registry": {
                    "type": "string",
                    "enum": ["npm", "pypi", "crates", "go"],
                },
                "reasoning": reasoning_prop(),
                "max_results": max_results_prop(1, 20, 10),
            },
            "required": ["query", "registry", "reasoning"]
        }),
        "github_repo" => json!({
            "type": "object",
            "properties": {
                "repo": {
                    "type": "string",
                    "description": "owner/repo, a GitHub URL, or a .git clone URL",
                },
                "reasoning": reasoning_prop(),
                "include_commits": { "type": "boolean", "default": true },
            },
            "required": ["repo", "reasoning"]
        }),
        "translate_error" => json!({
            "type": "object",
            "properties": {
                "error_message": { "type": "string", "description": "The pasted error text" },
                "reasoning": reasoning_prop(),
                "language": {
                    "type": "string",
                    "enum": ["python", "javascript", "typescript", "rust", "java", "go"],
                },
                "framework": {
                    "type": "string",
                    "enum": ["react", "vue", "angular", "django", "flask", "fastapi", "express", "next"],
                },
                "max_results": max_results_prop(1, 10, 5),
            },
            "required": ["error_message", "reasoning"]
        }),
        "api_docs" => json!({
            "type": "object",
            "properties": {
                "api_name": { "type": "string", "description": "Service or library name" },
                "topic": { "type": "string", "description": "What to look up in the docs" },
                "reasoning": reasoning_prop(),
                "max_results": max_results_prop(1, 5, 3),
            },
            "required": ["api_name", "topic", "reasoning"]
        }),
        "extract_data" => json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Page to extract from" },
                "reasoning": reasoning_prop(),
                "extract_type": {
                    "type": "string",
                    "enum": ["table", "list", "fields", "json-ld", "auto"],
                    "default": "auto",
                },
                "selectors": {
                    "type": "object",
                    "additionalProperties": { "type": "string" },
                    "description": "name → CSS selector map (fields mode)",
                },
                "max_items": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 500,
                    "default": 100,
                },
            },
            "required": ["url", "reasoning"]
        }),
        "compare_tech" => json!({
            "type": "object",
            "properties": {
                "technologies": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 2,
                    "maxItems": 5,
                },
                "reasoning": reasoning_prop(),
                "category": {
                    "type": "string",
                    "enum": ["framework", "library", "database", "language", "tool", "auto"],
                    "default": "auto",
                },
                "aspects": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Override the category's default aspect list",
                },
                "max_results_per_tech": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 10,
                    "default": 3,
                },
            },
            "required": ["technologies", "reasoning"]
        }),
        "get_changelog" => json!({
            "type": "object",
            "properties": {
                "package": { "type": "string", "description": "Package to inspect" },
                "reasoning": reasoning_prop(),
                "registry": {
                    "type": "string",
                    "enum": ["npm", "pypi", "crates", "go", "auto"],
                    "default": "auto",
                },
                "from_version": { "type": "string" },
                "to_version": { "type": "string" },
                "max_releases": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "default": 10,
                },
            },
            "required": ["package", "reasoning"]
        }),
        "check_service_status" => json!({
            "type": "object",
            "properties": {
                "service": { "type": "string", "description": "Service name (aliases accepted)" },
                "reasoning": reasoning_prop(),
                "include_history": { "type": "boolean", "default": false },
                "days": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 90,
                    "default": 7,
                },
            },
            "required": ["service", "reasoning"]
        }),
        other => panic!("no schema registered for tool '{other}'"),
    }
}

/// JSON inventory for `--print-tools`.
pub fn tool_inventory_json(version: &str) -> Value {
    let tools: Vec<Value> = TOOL_CATALOG
        .iter()
        .map(|tool| json!({ "name": tool.name, "summary": tool.summary }))
        .collect();
    json!({
        "binary": "web-research-mcp",
        "version": version,
        "count": tools.len(),
        "tools": tools,
    })
}

/// Server-instructions blurb derived from the catalog.
pub fn tool_instructions() -> String {
    let mut lines = vec![
        "Web research assistant for AI agents: search, crawling, package and repo intel, error translation, API docs, extraction, comparisons, changelogs, and service status.".to_string(),
        "Every tool requires a 'reasoning' parameter describing why it is being called.".to_string(),
        "Tools:".to_string(),
    ];
    for tool in TOOL_CATALOG {
        lines.push(format!("- {}: {}", tool.name, tool.summary));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_has_a_schema_requiring_reasoning() {
        for tool in TOOL_CATALOG {
            let schema = input_schema(tool.name);
            let required: Vec<&str> = schema["required"]
                .as_array()
                .unwrap_or_else(|| panic!("{} has no required list", tool.name))
                .iter()
                .filter_map(|v| v.as_str())
                .collect();
            assert!(
                required.contains(&"reasoning"),
                "{} does not require reasoning",
                tool.name
            );
        }
    }

    #[test]
    fn inventory_lists_all_thirteen_tools() {
        let inventory = tool_inventory_json("0.0.0");
        assert_eq!(inventory["count"], 13);
        assert_eq!(inventory["tools"].as_array().unwrap().len(), 13);
    }
}
