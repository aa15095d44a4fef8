//! Prompt and resource surfaces: prompts resolve without upstream calls,
//! and the resource templates advertise the four URI schemes.

mod support;

use anyhow::{Context, Result};

use rmcp::model::GetPromptRequestParams;
use support::{spawn_server, CALL_TIMEOUT};

#[tokio::test]
async fn all_five_prompts_are_listed_and_resolve_offline() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    let prompts = tokio::time::timeout(CALL_TIMEOUT, service.list_prompts(Default::default()))
        .await
        .context("timeout listing prompts")??;
    let names: Vec<&str> = prompts.prompts.iter().map(|p| p.name.as_str()).collect();
    for expected in [
        "research_package",
        "debug_error",
        "compare_technologies",
        "evaluate_repository",
        "check_service_health",
    ] {
        assert!(names.contains(&expected), "missing prompt '{expected}'");
    }

    let request: GetPromptRequestParams = serde_json::from_value(serde_json::json!({
        "name": "research_package",
        "arguments": { "package": "express", "registry": "npm" }
    }))?;
    let result = tokio::time::timeout(CALL_TIMEOUT, service.get_prompt(request))
        .await
        .context("timeout getting prompt")??;
    assert!(!result.messages.is_empty());
    let rendered = serde_json::to_string(&result.messages)?;
    assert!(rendered.contains("express"));
    assert!(rendered.contains("npm"));

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn resource_templates_cover_the_four_schemes() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    let templates = tokio::time::timeout(
        CALL_TIMEOUT,
        service.list_resource_templates(Default::default()),
    )
    .await
    .context("timeout listing resource templates")??;

    let uris: Vec<String> = templates
        .resource_templates
        .iter()
        .map(|t| t.raw.uri_template.clone())
        .collect();
    for expected in [
        "package://{registry}/{name}",
        "github://{owner}/{repo}",
        "status://{service}",
        "changelog://{registry}/{package}",
    ] {
        assert!(
            uris.iter().any(|u| u == expected),
            "missing template '{expected}' (got {uris:?})"
        );
    }

    service.cancel().await.context("shutdown")?;
    Ok(())
}

#[tokio::test]
async fn malformed_resource_uris_are_rejected() -> Result<()> {
    let tmp = tempfile::tempdir().context("tempdir")?;
    let service = spawn_server(&tmp.path().join("usage.json")).await?;

    for uri in [
        "package://npm",
        "package://maven/junit",
        "bogus://x/y",
        "github://microsoft",
    ] {
        let request: rmcp::model::ReadResourceRequestParams =
            serde_json::from_value(serde_json::json!({ "uri": uri }))?;
        let outcome = tokio::time::timeout(CALL_TIMEOUT, service.read_resource(request))
            .await
            .context("timeout reading resource")?;
        assert!(outcome.is_err(), "expected rejection for '{uri}'");
    }

    service.cancel().await.context("shutdown")?;
    Ok(())
}
