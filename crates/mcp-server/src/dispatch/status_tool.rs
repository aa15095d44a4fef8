//! Handler for `check_service_status`.

use std::sync::Arc;

use research_clients::ServiceStatus;
use research_core::Result;

use super::args::{bool_or, int_in_range, require_str, Args};
use crate::state::AppState;

pub async fn check_service_status(state: &Arc<AppState>, args: &Args) -> Result<String> {
    let service = require_str(args, "service")?;
    let include_history = bool_or(args, "include_history", false)?;
    let days = int_in_range(args, "days", 1, 90, 7)?;

    let status = state
        .status
        .check_service(&service, include_history, days)
        .await?;
    Ok(format_status(&status))
}

fn format_status(status: &ServiceStatus) -> String {
    let mut lines = vec![format!(
        "{} {}: {}",
        status.status.emoji(),
        status.service,
        status.status.as_str()
    )];
    if let Some(url) = &status.status_page_url {
        lines.push(format!("Status page: {url}"));
    }
    lines.push(format!("Checked at: {}", status.checked_at));
    if let Some(note) = &status.note {
        lines.push(note.clone());
    }

    if status.current_incidents.is_empty() {
        lines.push("No active incidents reported.".to_string());
    } else {
        lines.push(String::new());
        lines.push("Current incidents:".to_string());
        for incident in &status.current_incidents {
            let mut line = format!("- {}", incident.title);
            if let Some(impact) = &incident.impact {
                line.push_str(&format!(" [{impact}]"));
            }
            if let Some(state) = &incident.status {
                line.push_str(&format!(" ({state})"));
            }
            lines.push(line);
            if let Some(summary) = &incident.summary {
                lines.push(format!("  {summary}"));
            }
        }
    }

    if !status.components.is_empty() {
        lines.push(String::new());
        lines.push("Components:".to_string());
        for component in &status.components {
            lines.push(format!(
                "- {} {}: {}",
                component.status.emoji(),
                component.name,
                component.status.as_str()
            ));
        }
    }

    if let Some(recent) = &status.recent_incidents {
        lines.push(String::new());
        if recent.is_empty() {
            lines.push("No incidents in the requested history window.".to_string());
        } else {
            lines.push("Recent incidents:".to_string());
            for incident in recent {
                let when = incident
                    .started_at
                    .as_deref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default();
                lines.push(format!("- {}{when}", incident.title));
            }
        }
    }

    if let Some(uptime) = status.uptime_percentage {
        lines.push(format!("Uptime: {uptime:.2}%"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_clients::{ServiceComponent, ServiceState};

    #[test]
    fn status_text_leads_with_emoji_and_state() {
        let status = ServiceStatus {
            service: "stripe".into(),
            status: ServiceState::Operational,
            status_page_url: Some("https://status.stripe.com".into()),
            checked_at: "2025-06-15T12:00:00Z".into(),
            current_incidents: vec![],
            components: vec![ServiceComponent {
                name: "API".into(),
                status: ServiceState::Operational,
            }],
            recent_incidents: None,
            uptime_percentage: None,
            note: None,
        };
        let text = format_status(&status);
        assert!(text.starts_with("✅ stripe: operational"));
        assert!(text.contains("https://status.stripe.com"));
        assert!(text.contains("No active incidents"));
        assert!(text.contains("API: operational"));
    }
}
