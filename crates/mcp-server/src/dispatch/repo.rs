//! Handler for `github_repo`.

use std::sync::Arc;

use research_clients::github::parse_repo_input;
use research_clients::RepoInfo;
use research_core::timefmt::format_count;
use research_core::Result;

use super::args::{bool_or, require_str, Args};
use crate::state::AppState;

pub async fn github_repo(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let raw = require_str(args, "repo")?;
    let include_commits = bool_or(args, "include_commits", true)?;

    let (owner, repo) = parse_repo_input(&raw)?;
    let info = state.github.repo_info(&owner, &repo, include_commits).await?;
    Ok(format_repo_info(&info))
}

fn format_repo_info(info: &RepoInfo) -> String {
    let mut lines = vec![
        format!("# {}", info.full_name),
        info.description.clone(),
        format!(
            "Stars: {}  Forks: {}  Watchers: {}",
            format_count(info.stars),
            format_count(info.forks),
            format_count(info.watchers)
        ),
    ];

    let open_prs = info
        .open_prs
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    lines.push(format!(
        "Open issues: {}  Open PRs: {open_prs}",
        info.open_issues
    ));

    if let Some(language) = &info.language {
        lines.push(format!("Language: {language}"));
    }
    if let Some(license) = &info.license {
        lines.push(format!("License: {license}"));
    }
    lines.push(format!("Last updated: {}", info.last_updated));
    if info.archived {
        lines.push("Archived: yes".to_string());
    }
    if info.size_kb > 0 {
        lines.push(format!("Size: {} KB", info.size_kb));
    }
    if !info.topics.is_empty() {
        lines.push(format!("Topics: {}", info.topics.join(", ")));
    }
    if let Some(homepage) = &info.homepage {
        lines.push(format!("Homepage: {homepage}"));
    }

    if !info.recent_commits.is_empty() {
        lines.push(String::new());
        lines.push("Recent commits:".to_string());
        for commit in &info.recent_commits {
            lines.push(format!(
                "- {} {} ({}, {})",
                commit.sha, commit.message, commit.author, commit.date
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_clients::Commit;

    #[test]
    fn repo_text_includes_counts_and_commits() {
        let info = RepoInfo {
            full_name: "tokio-rs/tokio".into(),
            description: "A runtime for writing reliable async applications".into(),
            stars: 26500,
            forks: 2400,
            watchers: 26500,
            open_issues: 210,
            open_prs: Some(18),
            language: Some("Rust".into()),
            license: Some("MIT License".into()),
            last_updated: "5h ago".into(),
            topics: vec!["async".into(), "rust".into()],
            homepage: Some("https://tokio.rs".into()),
            archived: false,
            size_kb: 24_000,
            recent_commits: vec![Commit {
                sha: "abcd1234".into(),
                message: "fix scheduler wakeup".into(),
                author: "Alice".into(),
                date: "2d ago".into(),
                url: String::new(),
            }],
        };
        let text = format_repo_info(&info);
        assert!(text.contains("tokio-rs/tokio"));
        assert!(text.contains("26.5K"));
        assert!(text.contains("Open PRs: 18"));
        assert!(text.contains("abcd1234 fix scheduler wakeup"));
    }

    #[test]
    fn unknown_pr_count_renders_as_unknown() {
        let info = RepoInfo {
            full_name: "a/b".into(),
            description: "d".into(),
            stars: 0,
            forks: 0,
            watchers: 0,
            open_issues: 0,
            open_prs: None,
            language: None,
            license: None,
            last_updated: "unknown".into(),
            topics: vec![],
            homepage: None,
            archived: false,
            size_kb: 0,
            recent_commits: vec![],
        };
        assert!(format_repo_info(&info).contains("Open PRs: unknown"));
    }
}
