//! Degraded-upstream behavior: failures become apologetic text replies,
//! every call is tracked, and the clamp applies to whatever is returned.

mod support;

use anyhow::{Context, Result};
use tokio::process::Command;

use rmcp::service::ServiceExt;
use rmcp::transport::TokioChildProcess;
use support::{call_params, locate_server_bin, result_text, spawn_server, CALL_TIMEOUT, DEAD_SEARX_URL};

#[tokio::test]
async fn unreachable_search_yields_apologetic_text_and_failure_event() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let usage_path = tmp.path().join("usage.json");
    let service = spawn_server(&usage_path).await?;

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "web_search",
            serde_json::json!({ "query": "anything", "reasoning": "offline test" }),
        )),
    )
    .await??;

    assert_eq!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(
        text.contains("searxng") && text.contains("unavailable"),
        "expected the upstream to be named, got: {text}"
    );

    let store: serde_json::Value = serde_json::from_slice(&std::fs::read(&usage_path)?)?;
    let event = &store["sessions"][0];
    assert_eq!(event["success"], false);
    assert_eq!(event["reasoning"], "offline test");
    assert!(event["error_message"].as_str().unwrap().contains("searxng"));
    assert_eq!(
        event["response_size_bytes"].as_u64().unwrap(),
        text.len() as u64
    );
    // Session id groups by wall-clock hour: YYYYMMDD_HH.
    let session_id = event["session_id"].as_str().unwrap();
    assert_eq!(session_id.len(), 11);
    assert_eq!(session_id.as_bytes()[8], b'_');

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn one_event_per_invocation_across_mixed_outcomes() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let usage_path = tmp.path().join("usage.json");
    let service = spawn_server(&usage_path).await?;

    // Failure (upstream down), rejection (no reasoning), graceful success.
    for (tool, args) in [
        ("web_search", serde_json::json!({ "query": "q", "reasoning": "r" })),
        ("web_search", serde_json::json!({ "query": "q" })),
        ("search_images", serde_json::json!({ "query": "q", "reasoning": "r" })),
    ] {
        tokio::time::timeout(CALL_TIMEOUT, service.call_tool(call_params(tool, args)))
            .await
            .context("timeout")??;
    }

    let store: serde_json::Value = serde_json::from_slice(&std::fs::read(&usage_path)?)?;
    let sessions = store["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 3, "one usage event per invocation");
    assert_eq!(store["summary"]["totals"]["total_calls"], 3);
    assert_eq!(store["summary"]["tools"]["web_search"]["count"], 2);
    assert_eq!(store["summary"]["tools"]["web_search"]["success_count"], 0);
    assert_eq!(store["summary"]["tools"]["search_images"]["success_count"], 1);

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn responses_are_clamped_to_the_configured_budget() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let usage_path = tmp.path().join("usage.json");

    let bin = locate_server_bin()?;
    let mut cmd = Command::new(bin);
    cmd.env("SEARXNG_BASE_URL", DEAD_SEARX_URL);
    cmd.env("RESEARCH_HTTP_RETRIES", "1");
    cmd.env("MCP_USAGE_LOG", &usage_path);
    cmd.env("MCP_MAX_RESPONSE_CHARS", "50");
    cmd.env_remove("PIXABAY_API_KEY");
    cmd.env_remove("GITHUB_TOKEN");

    let transport = TokioChildProcess::new(cmd).context("spawn")?;
    let service = tokio::time::timeout(support::STARTUP_TIMEOUT, ().serve(transport))
        .await
        .context("startup timeout")??;

    // The unavailable-upstream apology is longer than 50 chars, so the
    // reply must come back clamped with the truncation suffix.
    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "web_search",
            serde_json::json!({ "query": "anything", "reasoning": "clamp test" }),
        )),
    )
    .await??;

    let text = result_text(&result);
    assert!(
        text.chars().count() <= 50,
        "reply exceeds clamp: {} chars",
        text.chars().count()
    );
    assert!(
        text.ends_with("…[truncated]"),
        "clamped reply must end with the truncation suffix, got: {text}"
    );

    let store: serde_json::Value = serde_json::from_slice(&std::fs::read(&usage_path)?)?;
    assert_eq!(
        store["sessions"][0]["response_size_bytes"].as_u64().unwrap(),
        text.len() as u64
    );

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn unknown_status_service_returns_a_suggestion() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    // Not in the curated table; the five pattern probes resolve against
    // nonexistent hosts, each bounded by the status client's deadline.
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(80),
        service.call_tool(call_params(
            "check_service_status",
            serde_json::json!({
                "service": "definitely-not-a-real-service-xyz",
                "reasoning": "status test"
            }),
        )),
    )
    .await??;

    assert_eq!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(
        text.contains("status page"),
        "expected a status-page suggestion, got: {text}"
    );

    service.cancel().await.context("shutdown")?;
    Ok(())
}
