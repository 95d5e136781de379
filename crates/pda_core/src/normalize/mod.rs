pub mod timestamps;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Incident, IncidentSnapshot, ValidationWarning};

/// Shape of one `/incidents` entry, restricted to the fields the menu needs.
#[derive(Debug, Deserialize)]
struct RawIncident {
    incident_number: u64,
    created_at: String,
    last_status_change_at: String,
    status: String,
    urgency: String,
    title: String,
    html_url: String,
}

impl From<RawIncident> for Incident {
    fn from(raw: RawIncident) -> Self {
        Incident {
            id: raw.incident_number,
            created_at: raw.created_at,
            last_status_change_at: raw.last_status_change_at,
            status: raw.status.into(),
            urgency: raw.urgency.into(),
            title: raw.title,
            html_url: raw.html_url,
        }
    }
}

/// Build a snapshot from a raw `/incidents` payload.
///
/// Contract:
/// - A payload without an `incidents` array is a valid, empty snapshot.
/// - Entries with missing or mistyped required fields are skipped with a warning, so one bad
///   entry never blanks the whole view.
/// - The raw payload is retained verbatim on the snapshot for the no-op comparison.
pub fn normalize_incidents(raw: Value) -> (IncidentSnapshot, Vec<ValidationWarning>) {
    let mut warnings = Vec::new();
    let mut snapshot = IncidentSnapshot::default();

    if let Some(entries) = raw.get("incidents").and_then(Value::as_array) {
        for (index, entry) in entries.iter().enumerate() {
            match RawIncident::deserialize(entry) {
                Ok(parsed) => {
                    let incident = Incident::from(parsed);
                    if snapshot.incidents.contains_key(&incident.id) {
                        warnings.push(
                            ValidationWarning::new(
                                "NORMALIZE_INCIDENT_DUPLICATE",
                                format!("Duplicate incident #{}; keeping the later entry", incident.id),
                            )
                            .with_details(format!("index={index}")),
                        );
                    }
                    snapshot.incidents.insert(incident.id, incident);
                }
                Err(e) => {
                    let number = entry
                        .get("incident_number")
                        .map(Value::to_string)
                        .unwrap_or_else(|| "UNKNOWN".to_string());
                    warnings.push(
                        ValidationWarning::new(
                            "NORMALIZE_INCIDENT_SKIPPED",
                            "Skipped malformed incident entry",
                        )
                        .with_details(format!("index={index}; incident_number={number}; err={e}")),
                    );
                }
            }
        }
    }

    snapshot.raw = Some(raw);
    (snapshot, warnings)
}

/// Normalize an optional payload; `None` (nothing persisted yet) stays uninitialised.
pub fn normalize_optional(raw: Option<Value>) -> (IncidentSnapshot, Vec<ValidationWarning>) {
    match raw {
        Some(raw) => normalize_incidents(raw),
        None => (IncidentSnapshot::uninitialized(), Vec::new()),
    }
}
