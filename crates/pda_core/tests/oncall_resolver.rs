mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::oncall_entry;
use pda_core::normalize::timestamps::{parse_pagerduty_utc, TimeDisplay};
use pda_core::oncall::resolve_oncall;

fn display() -> TimeDisplay {
    TimeDisplay::new("[hour]:[minute]", "Etc/UTC").expect("display")
}

#[test]
fn union_spans_all_level_one_windows_and_keeps_team_windows() {
    let raw = json!({"oncalls": [
        oncall_entry(1, "PSCHED_A", "Payments", "2026-04-01T10:00:00Z", "2026-04-01T12:00:00Z"),
        oncall_entry(1, "PSCHED_B", "Search", "2026-04-01T11:00:00Z", "2026-04-01T13:00:00Z"),
    ]});
    let (window, warnings) = resolve_oncall(&raw, &display());
    assert!(warnings.is_empty(), "{warnings:?}");
    assert!(window.active);

    let overall = window.overall.as_ref().expect("overall window");
    assert_eq!(overall.start, parse_pagerduty_utc("2026-04-01T10:00:00Z").unwrap());
    assert_eq!(overall.end, parse_pagerduty_utc("2026-04-01T13:00:00Z").unwrap());
    assert_eq!(overall.local_start, "10:00 UTC");
    assert_eq!(overall.local_end, "13:00 UTC");

    let a = &window.teams["PSCHED_A"];
    assert_eq!(a.name, "Payments");
    assert_eq!((a.window.utc_start.as_str(), a.window.utc_end.as_str()), ("10:00 UTC", "12:00 UTC"));
    let b = &window.teams["PSCHED_B"];
    assert_eq!((b.window.local_start.as_str(), b.window.local_end.as_str()), ("11:00 UTC", "13:00 UTC"));
}

#[test]
fn higher_escalation_levels_never_touch_the_window() {
    let level_one = json!({"oncalls": [
        oncall_entry(1, "PSCHED_A", "Payments", "2026-04-01T10:00:00Z", "2026-04-01T12:00:00Z"),
    ]});
    let with_level_two = json!({"oncalls": [
        oncall_entry(2, "PSCHED_Z", "Escalation", "2026-03-31T00:00:00Z", "2026-04-03T00:00:00Z"),
        oncall_entry(1, "PSCHED_A", "Payments", "2026-04-01T10:00:00Z", "2026-04-01T12:00:00Z"),
    ]});

    let (expected, _) = resolve_oncall(&level_one, &display());
    let (actual, warnings) = resolve_oncall(&with_level_two, &display());
    assert!(warnings.is_empty());
    assert_eq!(actual, expected);
    assert!(!actual.teams.contains_key("PSCHED_Z"));
}

#[test]
fn only_higher_levels_means_inactive() {
    let raw = json!({"oncalls": [
        oncall_entry(3, "PSCHED_Z", "Escalation", "2026-04-01T00:00:00Z", "2026-04-02T00:00:00Z"),
    ]});
    let (window, _) = resolve_oncall(&raw, &display());
    assert!(!window.active);
    assert!(window.overall.is_none());
    assert!(window.teams.is_empty());
}

#[test]
fn on_call_check_is_half_open() {
    let raw = json!({"oncalls": [
        oncall_entry(1, "PSCHED_A", "Payments", "2026-04-01T10:00:00Z", "2026-04-01T12:00:00Z"),
    ]});
    let (window, _) = resolve_oncall(&raw, &display());
    assert!(window.is_on_call_at(parse_pagerduty_utc("2026-04-01T10:00:00Z").unwrap()));
    assert!(window.is_on_call_at(parse_pagerduty_utc("2026-04-01T11:59:59Z").unwrap()));
    assert!(!window.is_on_call_at(parse_pagerduty_utc("2026-04-01T12:00:00Z").unwrap()));
    assert!(!window.is_on_call_at(parse_pagerduty_utc("2026-04-01T09:59:59Z").unwrap()));
}

#[test]
fn malformed_entries_are_skipped_with_warnings() {
    let raw = json!({"oncalls": [
        oncall_entry(1, "PSCHED_A", "Payments", "2026-04-01 10:00", "2026-04-01T12:00:00Z"),
        { "escalation_level": 1, "start": "2026-04-01T10:00:00Z" },
        oncall_entry(1, "PSCHED_B", "Search", "2026-04-01T11:00:00Z", "2026-04-01T13:00:00Z"),
    ]});
    let (window, warnings) = resolve_oncall(&raw, &display());
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.code == "ONCALL_ENTRY_SKIPPED"));
    let shape = warnings[1].details.as_deref().unwrap_or_default();
    assert!(shape.starts_with("index=1; err="), "{shape}");
    assert!(shape.contains("missing field `end`"), "{shape}");
    assert_eq!(window.teams.keys().collect::<Vec<_>>(), vec!["PSCHED_B"]);
    assert_eq!(
        window.overall.as_ref().map(|w| w.local_start.clone()),
        Some("11:00 UTC".to_string())
    );
}

#[test]
fn missing_oncalls_key_is_inactive() {
    let (window, warnings) = resolve_oncall(&json!({"error": "nope"}), &display());
    assert!(!window.active);
    assert_eq!(warnings[0].code, "ONCALL_PAYLOAD_MISSING");
}
