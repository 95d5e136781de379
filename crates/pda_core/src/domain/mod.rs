use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// PagerDuty `incident_number`; stable across polls and unique within a snapshot.
pub type IncidentId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum IncidentStatus {
    Triggered,
    Acknowledged,
    /// Anything else the API reports, case-folded.
    Other(String),
}

impl From<String> for IncidentStatus {
    fn from(raw: String) -> Self {
        let folded = raw.to_lowercase();
        match folded.as_str() {
            "triggered" => Self::Triggered,
            "acknowledged" => Self::Acknowledged,
            _ => Self::Other(folded),
        }
    }
}

impl From<IncidentStatus> for String {
    fn from(status: IncidentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl IncidentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Triggered => "triggered",
            Self::Acknowledged => "acknowledged",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Urgency {
    High,
    Low,
    Other(String),
}

impl From<String> for Urgency {
    fn from(raw: String) -> Self {
        let folded = raw.to_lowercase();
        match folded.as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Other(folded),
        }
    }
}

impl From<Urgency> for String {
    fn from(urgency: Urgency) -> Self {
        urgency.as_str().to_string()
    }
}

impl Urgency {
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "high",
            Self::Low => "low",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal incident view extracted from one `/incidents` entry.
///
/// Timestamps stay as the API's strings: they are only ever displayed, never compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incident {
    pub id: IncidentId,
    pub created_at: String,
    pub last_status_change_at: String,
    pub status: IncidentStatus,
    pub urgency: Urgency,
    pub title: String,
    pub html_url: String,
}

impl Incident {
    /// Triggered and high urgency: the condition that drives the alert glyph and sound.
    pub fn is_high_unacked(&self) -> bool {
        self.status == IncidentStatus::Triggered && self.urgency == Urgency::High
    }
}

/// All open incidents as of one fetch.
///
/// `raw` is the payload the map was derived from. `None` means no payload was ever seen
/// (first run with no persisted file), which differs from a payload holding zero incidents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentSnapshot {
    pub raw: Option<serde_json::Value>,
    pub incidents: BTreeMap<IncidentId, Incident>,
}

impl IncidentSnapshot {
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn is_uninitialized(&self) -> bool {
        self.raw.is_none()
    }

    pub fn get(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.get(&id)
    }

    pub fn contains(&self, id: IncidentId) -> bool {
        self.incidents.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    pub fn has_high_unacked(&self) -> bool {
        self.iter().any(Incident::is_high_unacked)
    }

    pub fn with_status<'a>(
        &'a self,
        status: &'a IncidentStatus,
    ) -> impl Iterator<Item = &'a Incident> + 'a {
        self.iter().filter(move |i| &i.status == status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
