use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::domain::ValidationWarning;
use crate::error::AppError;
use crate::normalize::timestamps::{parse_pagerduty_utc, TimeDisplay};

/// Only primary responders are surfaced.
pub const PRIMARY_ESCALATION_LEVEL: u64 = 1;

/// A start/end pair with its display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub utc_start: String,
    pub utc_end: String,
    pub local_start: String,
    pub local_end: String,
}

impl ShiftWindow {
    fn build(start: OffsetDateTime, end: OffsetDateTime, display: &TimeDisplay) -> Result<Self, AppError> {
        Ok(Self {
            start,
            end,
            utc_start: display.format_utc(start)?,
            utc_end: display.format_utc(end)?,
            local_start: display.format_local(start)?,
            local_end: display.format_local(end)?,
        })
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamWindow {
    pub id: String,
    pub name: String,
    pub window: ShiftWindow,
}

/// Level-1 on-call coverage for one user, merged across schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnCallWindow {
    pub active: bool,
    /// Union of every team window: earliest start, latest end.
    pub overall: Option<ShiftWindow>,
    pub teams: BTreeMap<String, TeamWindow>,
}

impl OnCallWindow {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Evaluated against the caller's clock every time; never cached.
    pub fn is_on_call_at(&self, now: OffsetDateTime) -> bool {
        self.active && self.overall.as_ref().is_some_and(|w| w.contains(now))
    }
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
    id: String,
    summary: String,
}

#[derive(Debug, Deserialize)]
struct RawOnCall {
    escalation_level: u64,
    start: String,
    end: String,
    schedule: RawSchedule,
}

/// Merge the `/oncalls` reply into one window.
///
/// Entries above escalation level 1 never influence the result. Per-team windows are kept as
/// reported; only the overall window is a union. Malformed level-1 entries are skipped with a
/// warning.
pub fn resolve_oncall(raw: &Value, display: &TimeDisplay) -> (OnCallWindow, Vec<ValidationWarning>) {
    let mut warnings = Vec::new();
    let mut window = OnCallWindow::inactive();

    let Some(entries) = raw.get("oncalls").and_then(Value::as_array) else {
        warnings.push(ValidationWarning::new(
            "ONCALL_PAYLOAD_MISSING",
            "On-call reply has no oncalls list",
        ));
        return (window, warnings);
    };

    let mut span: Option<(OffsetDateTime, OffsetDateTime)> = None;

    for (index, entry) in entries.iter().enumerate() {
        if entry.get("escalation_level").and_then(Value::as_u64) != Some(PRIMARY_ESCALATION_LEVEL) {
            continue;
        }

        let oc = match RawOnCall::deserialize(entry) {
            Ok(oc) => oc,
            Err(e) => {
                warnings.push(
                    ValidationWarning::new("ONCALL_ENTRY_SKIPPED", "Skipped malformed on-call entry")
                        .with_details(format!("index={index}; err={e}")),
                );
                continue;
            }
        };

        let parsed = parse_pagerduty_utc(&oc.start).and_then(|start| {
            let end = parse_pagerduty_utc(&oc.end)?;
            ShiftWindow::build(start, end, display)
        });
        let (schedule, shift) = match parsed {
            Ok(shift) => (oc.schedule, shift),
            Err(e) => {
                warnings.push(
                    ValidationWarning::new("ONCALL_ENTRY_SKIPPED", "Skipped malformed on-call entry")
                        .with_details(format!(
                            "index={index}; err={}; {}",
                            e.message,
                            e.details.as_deref().unwrap_or("")
                        )),
                );
                continue;
            }
        };

        span = Some(match span {
            None => (shift.start, shift.end),
            Some((s, e)) => (s.min(shift.start), e.max(shift.end)),
        });
        window.teams.insert(
            schedule.id.clone(),
            TeamWindow {
                id: schedule.id,
                name: schedule.summary,
                window: shift,
            },
        );
    }

    if let Some((start, end)) = span {
        match ShiftWindow::build(start, end, display) {
            Ok(overall) => {
                window.active = true;
                window.overall = Some(overall);
            }
            Err(e) => warnings.push(
                ValidationWarning::new("ONCALL_WINDOW_FORMAT_FAILED", "Failed to format on-call window")
                    .with_details(e.to_string()),
            ),
        }
    }

    (window, warnings)
}
