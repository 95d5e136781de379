use crate::domain::{Incident, IncidentId, IncidentSnapshot, IncidentStatus, Urgency};

/// How one incident id moved between the previous and current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// First seen this poll while triggered at high urgency.
    NewTriggered,
    StatusChanged {
        from: IncidentStatus,
        to: IncidentStatus,
    },
    /// Present before, gone now: resolved or rolled out of the query window.
    NoLongerPresent,
    /// Same status, or newly seen but not worth an alert.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    NewIncident,
    StatusChanged {
        from: IncidentStatus,
        to: IncidentStatus,
    },
    NoLongerActive,
}

/// One popup worth of detail about a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub incident_id: IncidentId,
    pub urgency: Urgency,
    pub created_at: String,
    pub last_status_change_at: String,
    pub title: String,
    pub html_url: String,
}

impl Notification {
    fn about(kind: NotificationKind, incident: &Incident) -> Self {
        Self {
            kind,
            incident_id: incident.id,
            urgency: incident.urgency.clone(),
            created_at: incident.created_at.clone(),
            last_status_change_at: incident.last_status_change_at.clone(),
            title: incident.title.clone(),
            html_url: incident.html_url.clone(),
        }
    }

    pub fn headline(&self) -> String {
        match &self.kind {
            NotificationKind::NewIncident => format!("New Incident triggered: {}", self.incident_id),
            NotificationKind::StatusChanged { from, to } => {
                format!("Incident {}: {from} -> {to}", self.incident_id)
            }
            NotificationKind::NoLongerActive => {
                format!("Incident no longer active: {}", self.incident_id)
            }
        }
    }

    pub fn body(&self) -> String {
        let lead = match &self.kind {
            NotificationKind::NewIncident => format!("Incident #{} triggered", self.incident_id),
            NotificationKind::StatusChanged { from, to } => {
                format!("Incident #{} changed from {from} to {to}.", self.incident_id)
            }
            NotificationKind::NoLongerActive => {
                format!("Incident #{} no longer active:", self.incident_id)
            }
        };
        format!(
            "{lead}\nUrgency: {}\nCreated: {}\nUpdated: {}\n\n{}",
            self.urgency, self.created_at, self.last_status_change_at, self.title
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOutcome {
    pub notifications: Vec<Notification>,
    /// Rising edge of "some high-urgency incident is triggered".
    pub should_play_sound: bool,
}

/// Classify one id. Ids absent from both snapshots are `Unchanged`.
pub fn classify(id: IncidentId, current: &IncidentSnapshot, previous: &IncidentSnapshot) -> Transition {
    match (current.get(id), previous.get(id)) {
        (Some(now), Some(before)) if now.status != before.status => Transition::StatusChanged {
            from: before.status.clone(),
            to: now.status.clone(),
        },
        (Some(now), None) if now.is_high_unacked() => Transition::NewTriggered,
        (None, Some(_)) => Transition::NoLongerPresent,
        _ => Transition::Unchanged,
    }
}

/// Compare two snapshots and decide what to announce.
///
/// Identical raw payloads (or no current payload at all) short-circuit to nothing, which is
/// what keeps repeated polls of unchanged data silent. Everything past that guard works on the
/// normalized incidents. The sound fires only when the current poll has a triggered
/// high-urgency incident and the previous one had none.
pub fn diff(current: &IncidentSnapshot, previous: &IncidentSnapshot) -> DiffOutcome {
    if current.is_uninitialized() || current.raw == previous.raw {
        return DiffOutcome::default();
    }

    let mut notifications = Vec::new();
    let mut has_high_unacked = false;

    for incident in current.iter() {
        if incident.is_high_unacked() {
            has_high_unacked = true;
        }
        match classify(incident.id, current, previous) {
            Transition::StatusChanged { from, to } => notifications.push(Notification::about(
                NotificationKind::StatusChanged { from, to },
                incident,
            )),
            Transition::NewTriggered => {
                notifications.push(Notification::about(NotificationKind::NewIncident, incident))
            }
            Transition::NoLongerPresent | Transition::Unchanged => {}
        }
    }

    for gone in previous.iter().filter(|i| !current.contains(i.id)) {
        notifications.push(Notification::about(NotificationKind::NoLongerActive, gone));
    }

    let has_high_unacked_previous = previous.has_high_unacked();

    DiffOutcome {
        notifications,
        should_play_sound: has_high_unacked && !has_high_unacked_previous,
    }
}
