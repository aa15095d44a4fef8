//! Human-facing time and count rendering shared by the repo, registry, and
//! changelog surfaces.

use chrono::{DateTime, Utc};

/// Render an ISO-8601 timestamp as "3h ago" / "2d ago" / "4mo ago".
///
/// Unparseable input is returned verbatim so upstream oddities stay visible
/// instead of vanishing into "unknown".
pub fn format_time_ago(iso_time: &str) -> String {
    if iso_time.is_empty() {
        return "unknown".to_string();
    }
    let Some(then) = parse_iso(iso_time) else {
        return iso_time.to_string();
    };
    format_time_ago_from(then, Utc::now())
}

fn format_time_ago_from(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    if diff.num_seconds() < 0 {
        return "just now".to_string();
    }
    let days = diff.num_days();
    if days < 1 {
        let hours = diff.num_hours();
        if hours < 1 {
            let minutes = diff.num_minutes();
            return if minutes > 0 {
                format!("{minutes}m ago")
            } else {
                "just now".to_string()
            };
        }
        return format!("{hours}h ago");
    }
    if days < 30 {
        return format!("{days}d ago");
    }
    if days < 365 {
        return format!("{}mo ago", days / 30);
    }
    format!("{}y ago", days / 365)
}

/// Parse an ISO-8601 timestamp, tolerating the trailing `Z` and date-only
/// forms registries emit.
pub fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Some registries emit a bare date ("2024-11-02").
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(DateTime::from_naive_utc_and_offset(
            date.and_hms_opt(0, 0, 0)?,
            Utc,
        ));
    }
    None
}

/// Format a count as a compact human string: `1234` → `1.2K`, `50_300_000`
/// → `50.3M`.
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000_000 {
        format!("{:.1}B", count as f64 / 1_000_000_000.0)
    } else if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn relative_times_pick_the_right_unit() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let cases = [
            (Utc.with_ymd_and_hms(2025, 6, 15, 11, 58, 0).unwrap(), "2m ago"),
            (Utc.with_ymd_and_hms(2025, 6, 15, 7, 0, 0).unwrap(), "5h ago"),
            (Utc.with_ymd_and_hms(2025, 6, 12, 12, 0, 0).unwrap(), "3d ago"),
            (Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(), "3mo ago"),
            (Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap(), "3y ago"),
        ];
        for (then, expected) in cases {
            assert_eq!(format_time_ago_from(then, now), expected);
        }
    }

    #[test]
    fn unparseable_input_passes_through() {
        assert_eq!(format_time_ago("not-a-date"), "not-a-date");
        assert_eq!(format_time_ago(""), "unknown");
    }

    #[test]
    fn bare_dates_parse() {
        assert!(parse_iso("2024-11-02").is_some());
        assert!(parse_iso("2024-11-02T10:30:00Z").is_some());
        assert!(parse_iso("02/11/2024").is_none());
    }

    #[test]
    fn counts_compact_per_magnitude() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(50_300_000), "50.3M");
        assert_eq!(format_count(2_100_000_000), "2.1B");
    }
}
