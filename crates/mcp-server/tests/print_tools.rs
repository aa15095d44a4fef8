//! `--print-tools` must emit the catalog as JSON and exit cleanly, without
//! starting the MCP loop.

mod support;

use anyhow::{Context, Result};

#[tokio::test]
async fn print_tools_emits_the_catalog_inventory() -> Result<()> {
    let bin = support::locate_server_bin()?;
    let output = tokio::process::Command::new(bin)
        .arg("--print-tools")
        .output()
        .await
        .context("run --print-tools")?;

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("inventory is JSON")?;
    assert_eq!(payload["binary"], "web-research-mcp");
    assert_eq!(payload["count"], 13);
    let names: Vec<&str> = payload["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(names.contains(&"web_search"));
    assert!(names.contains(&"check_service_status"));
    Ok(())
}

#[tokio::test]
async fn version_flag_prints_and_exits() -> Result<()> {
    let bin = support::locate_server_bin()?;
    let output = tokio::process::Command::new(bin)
        .arg("--version")
        .output()
        .await?;
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("web-research-mcp "));
    Ok(())
}
