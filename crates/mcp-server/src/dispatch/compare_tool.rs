//! Handler for `compare_tech`.

use std::sync::Arc;

use research_core::{ResearchError, Result};
use research_pipelines::compare::{MAX_TECHNOLOGIES, MIN_TECHNOLOGIES};
use research_pipelines::{ComparisonMatrix, TechCategory};

use super::args::{enum_or, int_in_range, opt_str_array, Args};
use crate::state::AppState;

const CATEGORIES: &[&str] = &["framework", "library", "database", "language", "tool", "auto"];

pub async fn compare_tech(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let technologies = opt_str_array(args, "technologies")?.ok_or_else(|| {
        ResearchError::InputInvalid("Missing required parameter 'technologies'".into())
    })?;
    if technologies.len() < MIN_TECHNOLOGIES || technologies.len() > MAX_TECHNOLOGIES {
        return Err(ResearchError::InputInvalid(format!(
            "Parameter 'technologies' must list between {MIN_TECHNOLOGIES} and {MAX_TECHNOLOGIES} entries (got {})",
            technologies.len()
        )));
    }

    let category = match enum_or(args, "category", CATEGORIES, "auto")?.as_str() {
        "auto" => None,
        other => TechCategory::parse(other),
    };
    let aspects = opt_str_array(args, "aspects")?;
    let max_results_per_tech = int_in_range(args, "max_results_per_tech", 1, 10, 3)? as usize;

    let matrix = state
        .comparator
        .compare(&technologies, category, aspects, max_results_per_tech)
        .await?;
    Ok(format_matrix(&matrix))
}

fn format_matrix(matrix: &ComparisonMatrix) -> String {
    let mut lines = vec![format!(
        "# Comparison: {} ({})",
        matrix.technologies.join(" vs "),
        matrix.category.as_str()
    )];

    for (aspect, row) in &matrix.aspects {
        lines.push(String::new());
        lines.push(format!("## {}", aspect.replace('_', " ")));
        for tech in &matrix.technologies {
            let value = row
                .get(tech)
                .map(String::as_str)
                .unwrap_or("Information not found");
            lines.push(format!("- {tech}: {value}"));
        }
    }

    lines.push(String::new());
    lines.push("## Summary".to_string());
    for tech in &matrix.technologies {
        let value = matrix
            .summary
            .get(tech)
            .map(String::as_str)
            .unwrap_or("Information not found");
        lines.push(format!("- {tech}: {value}"));
    }

    if !matrix.sources.is_empty() {
        lines.push(String::new());
        lines.push(format!("Sources: {}", matrix.sources.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn matrix_formats_every_tech_per_aspect() {
        let mut aspects = BTreeMap::new();
        let mut row = BTreeMap::new();
        row.insert("react".to_string(), "fast enough".to_string());
        aspects.insert("performance".to_string(), row);

        let matrix = ComparisonMatrix {
            technologies: vec!["react".into(), "vue".into()],
            category: TechCategory::Framework,
            aspects,
            summary: BTreeMap::new(),
            sources: vec!["https://example.com".into()],
        };
        let text = format_matrix(&matrix);
        assert!(text.contains("react vs vue"));
        assert!(text.contains("- react: fast enough"));
        // Missing cells degrade to the placeholder.
        assert!(text.contains("- vue: Information not found"));
    }
}
