#![allow(dead_code)]

use pda_core::domain::IncidentSnapshot;
use pda_core::normalize::normalize_incidents;
use serde_json::{json, Value};

pub fn incident_json(number: u64, status: &str, urgency: &str) -> Value {
    json!({
        "id": format!("PINC{number}"),
        "incident_number": number,
        "created_at": "2026-02-01T09:00:00Z",
        "last_status_change_at": "2026-02-01T09:15:00Z",
        "status": status,
        "urgency": urgency,
        "title": format!("Checkout latency #{number}"),
        "html_url": format!("https://acme.pagerduty.com/incidents/PINC{number}"),
    })
}

pub fn payload(entries: &[(u64, &str, &str)]) -> Value {
    let incidents: Vec<Value> = entries
        .iter()
        .map(|(n, s, u)| incident_json(*n, s, u))
        .collect();
    json!({ "incidents": incidents, "limit": 50, "more": false })
}

pub fn snapshot(entries: &[(u64, &str, &str)]) -> IncidentSnapshot {
    normalize_incidents(payload(entries)).0
}

pub fn oncall_entry(level: u64, schedule_id: &str, name: &str, start: &str, end: &str) -> Value {
    json!({
        "escalation_level": level,
        "start": start,
        "end": end,
        "schedule": { "id": schedule_id, "summary": name, "type": "schedule_reference" },
        "user": { "id": "PUSER1" },
    })
}
