//! Handler for `api_docs`.

use std::sync::Arc;

use research_core::Result;

use super::args::{int_in_range, require_str, Args};
use crate::state::AppState;

pub async fn api_docs(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let api_name = require_str(args, "api_name")?;
    let topic = require_str(args, "topic")?;
    let max_results = int_in_range(args, "max_results", 1, 5, 3)? as usize;

    let doc = state
        .doc_discoverer
        .get_api_docs(&api_name, &topic, max_results)
        .await?;

    let mut lines = vec![format!("# {} docs: {}", doc.api_name, doc.topic)];
    if let Some(base) = &doc.docs_base_url {
        lines.push(format!("Base: {base}"));
    }
    if let Some(overview) = &doc.overview {
        lines.push(String::new());
        lines.push(overview.clone());
    }

    if !doc.parameters.is_empty() {
        lines.push(String::new());
        lines.push("## Parameters".to_string());
        for param in &doc.parameters {
            lines.push(format!(
                "- {} ({}): {}",
                param.name, param.param_type, param.description
            ));
        }
    }

    if !doc.examples.is_empty() {
        lines.push(String::new());
        lines.push("## Examples".to_string());
        for example in &doc.examples {
            lines.push(format!("```{}\n{}\n```", example.language, example.code));
        }
    }

    if !doc.notes.is_empty() {
        lines.push(String::new());
        lines.push("## Notes".to_string());
        for note in &doc.notes {
            lines.push(format!("- {note}"));
        }
    }

    if !doc.related_links.is_empty() {
        lines.push(String::new());
        lines.push("## Related".to_string());
        for link in &doc.related_links {
            lines.push(format!("- [{}]({})", link.title, link.url));
        }
    }

    if !doc.sources.is_empty() {
        lines.push(String::new());
        lines.push(format!("Sources: {}", doc.sources.join(", ")));
    }

    Ok(lines.join("\n"))
}
