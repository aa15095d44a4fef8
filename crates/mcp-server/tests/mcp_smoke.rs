//! Catalog and validation smoke tests: the server must advertise the full
//! tool catalog and reject invalid invocations before touching any
//! upstream.

mod support;

use anyhow::{Context, Result};
use std::collections::HashSet;

use support::{call_params, result_text, spawn_server, CALL_TIMEOUT};

#[tokio::test]
async fn server_exposes_the_full_tool_catalog() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    let tools = tokio::time::timeout(CALL_TIMEOUT, service.list_tools(Default::default()))
        .await
        .context("timeout listing tools")??;
    let names: HashSet<&str> = tools.tools.iter().map(|t| t.name.as_ref()).collect();
    for expected in [
        "web_search",
        "search_examples",
        "search_images",
        "crawl_url",
        "package_info",
        "package_search",
        "github_repo",
        "translate_error",
        "api_docs",
        "extract_data",
        "compare_tech",
        "get_changelog",
        "check_service_status",
    ] {
        assert!(
            names.contains(expected),
            "missing tool '{expected}' (available: {names:?})"
        );
    }

    // Every advertised schema must require reasoning.
    for tool in &tools.tools {
        let required = tool
            .input_schema
            .get("required")
            .and_then(|v| v.as_array())
            .with_context(|| format!("{} schema has no required list", tool.name))?;
        assert!(
            required.iter().any(|v| v.as_str() == Some("reasoning")),
            "{} does not require reasoning",
            tool.name
        );
    }

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn missing_reasoning_is_rejected_and_tracked() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let usage_path = tmp.path().join("usage.json");
    let service = spawn_server(&usage_path).await?;

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "web_search",
            serde_json::json!({ "query": "rust async" }),
        )),
    )
    .await
    .context("timeout calling web_search")??;

    assert_eq!(result.is_error, Some(true), "expected rejection");
    let text = result_text(&result);
    assert!(
        text.contains("reasoning"),
        "rejection should mention reasoning, got: {text}"
    );

    // Exactly one usage event, recorded as a failure.
    let store: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&usage_path).context("read usage log")?)?;
    let sessions = store["sessions"].as_array().context("sessions array")?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["tool"], "web_search");
    assert_eq!(sessions[0]["success"], false);
    assert_eq!(
        sessions[0]["response_size_bytes"].as_u64().unwrap(),
        text.len() as u64
    );

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn out_of_range_and_bad_enum_values_are_rejected() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "web_search",
            serde_json::json!({ "query": "x", "reasoning": "test", "max_results": 99 }),
        )),
    )
    .await??;
    assert_eq!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(
        text.contains("max_results") && text.contains("between"),
        "expected range description, got: {text}"
    );

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "web_search",
            serde_json::json!({ "query": "x", "reasoning": "test", "category": "bogus" }),
        )),
    )
    .await??;
    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("category"));

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "compare_tech",
            serde_json::json!({ "technologies": ["react"], "reasoning": "test" }),
        )),
    )
    .await??;
    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("between 2 and 5"));

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn repo_input_shapes_are_validated_before_any_upstream_call() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "github_repo",
            serde_json::json!({ "repo": "https://github.com/microsoft", "reasoning": "test" }),
        )),
    )
    .await??;
    assert_eq!(result.is_error, Some(true));
    assert!(
        result_text(&result).contains("user/organization page"),
        "expected targeted rejection, got: {}",
        result_text(&result)
    );

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "github_repo",
            serde_json::json!({ "repo": "https://example.com/a/b", "reasoning": "test" }),
        )),
    )
    .await??;
    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("Not a GitHub URL"));

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn unconfigured_image_search_degrades_gracefully() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let usage_path = tmp.path().join("usage.json");
    let service = spawn_server(&usage_path).await?;

    let result = tokio::time::timeout(
        CALL_TIMEOUT,
        service.call_tool(call_params(
            "search_images",
            serde_json::json!({ "query": "sunset", "reasoning": "test" }),
        )),
    )
    .await??;

    // Not configured is a graceful answer, not an error.
    assert_ne!(result.is_error, Some(true));
    assert!(result_text(&result).contains("PIXABAY_API_KEY"));

    let store: serde_json::Value = serde_json::from_slice(&std::fs::read(&usage_path)?)?;
    assert_eq!(store["sessions"][0]["success"], true);

    service.cancel().await.context("shutdown")?;
    Ok(())
}
