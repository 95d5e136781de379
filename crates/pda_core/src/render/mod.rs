use std::fmt::Write as _;

use time::OffsetDateTime;

use crate::domain::{Incident, IncidentSnapshot, IncidentStatus, Urgency};
use crate::error::AppError;
use crate::oncall::OnCallWindow;

pub const STALE_WARNING: &str = "WARNING: Data is stale, unable to update.";

/// Menu colours, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub high: String,
    pub low: String,
    pub menu: String,
    pub info: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            high: "#FFFF00".to_string(),
            low: "#8888FF".to_string(),
            menu: "#666666".to_string(),
            info: "#00CC00".to_string(),
        }
    }
}

impl Palette {
    pub fn for_urgency(&self, urgency: &Urgency) -> &str {
        match urgency {
            Urgency::High => &self.high,
            Urgency::Low | Urgency::Other(_) => &self.low,
        }
    }
}

/// Title-bar glyphs, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub alert: String,
    pub on_call: String,
    pub off_call: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            alert: "📟🚨".to_string(),
            on_call: "📟☎️".to_string(),
            off_call: "📟💤".to_string(),
        }
    }
}

/// The PagerDuty account the menu links into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLinks {
    pub company: String,
    pub user: String,
}

impl AccountLinks {
    pub fn on_call_calendar(&self) -> String {
        format!(
            "https://{}.pagerduty.com/users/{}/on-call/month",
            self.company, self.user
        )
    }

    pub fn schedule(&self, schedule_id: &str) -> String {
        format!("https://{}.pagerduty.com/schedules/{schedule_id}", self.company)
    }
}

/// Everything one render needs. `now` is the wall clock at render time.
#[derive(Debug, Clone, Copy)]
pub struct MenuState<'a> {
    pub incidents: &'a IncidentSnapshot,
    pub oncall: &'a OnCallWindow,
    pub oncall_error: Option<&'a AppError>,
    /// Set when the incidents fetch failed and `incidents` is the persisted reply.
    pub stale: Option<&'a AppError>,
    pub now: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct MenuRenderer {
    palette: Palette,
    glyphs: Glyphs,
    links: AccountLinks,
}

impl MenuRenderer {
    pub fn new(palette: Palette, glyphs: Glyphs, links: AccountLinks) -> Self {
        Self {
            palette,
            glyphs,
            links,
        }
    }

    pub fn glyph(&self, state: &MenuState<'_>) -> &str {
        if state.incidents.has_high_unacked() {
            &self.glyphs.alert
        } else if state.oncall.is_on_call_at(state.now) {
            &self.glyphs.on_call
        } else {
            &self.glyphs.off_call
        }
    }

    /// Render the full plugin output, one menu item per line.
    pub fn render(&self, state: &MenuState<'_>) -> String {
        let mut out = String::new();
        push(&mut out, self.glyph(state));
        push(&mut out, "---");
        self.render_oncall(&mut out, state);

        if let Some(err) = state.stale {
            push(&mut out, STALE_WARNING);
            push(&mut out, &clean(&err.message));
        }

        self.render_incidents(&mut out, state.incidents);
        out
    }

    fn render_oncall(&self, out: &mut String, state: &MenuState<'_>) {
        let calendar = self.links.on_call_calendar();
        let menu = &self.palette.menu;
        let info = &self.palette.info;

        match state.oncall.overall.as_ref() {
            Some(overall) if state.oncall.is_on_call_at(state.now) => {
                push(out, &item("Status: Oncall ☎️", menu, Some(&calendar)));
                push(out, &item(&format!("-- Start: {}", overall.local_start), info, None));
                push(out, &item(&format!("--   End: {}", overall.local_end), info, None));
                push(out, "--");
                for team in state.oncall.teams.values() {
                    let href = self.links.schedule(&team.id);
                    push(out, &item(&format!("-- {}", clean(&team.name)), info, Some(&href)));
                    push(out, &item(&format!("---- {}", team.window.local_start), info, None));
                    push(out, &item(&format!("---- {}", team.window.local_end), info, None));
                }
            }
            _ => push(out, &item("Status: OffCall 💤", menu, Some(&calendar))),
        }

        if let Some(err) = state.oncall_error {
            push(out, &item(&clean(&err.message), menu, None));
        }
    }

    fn render_incidents(&self, out: &mut String, incidents: &IncidentSnapshot) {
        for (heading, status) in [
            ("Triggered", IncidentStatus::Triggered),
            ("Acknowledged", IncidentStatus::Acknowledged),
        ] {
            push(out, &item(heading, &self.palette.menu, None));
            for incident in incidents.with_status(&status) {
                push(out, &self.incident_line(incident));
            }
        }
    }

    fn incident_line(&self, incident: &Incident) -> String {
        item(
            &format!(
                "-- {} - {}: {}",
                incident.id,
                incident.urgency,
                clean(&incident.title)
            ),
            self.palette.for_urgency(&incident.urgency),
            Some(&incident.html_url),
        )
    }
}

fn push(out: &mut String, line: &str) {
    let _ = writeln!(out, "{line}");
}

fn item(text: &str, color: &str, href: Option<&str>) -> String {
    match href {
        Some(href) => format!("{text} | color='{color}' href='{href}'"),
        None => format!("{text} | color='{color}'"),
    }
}

/// Keep free text on one line and out of the `|` parameter separator.
fn clean(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '|' => '¦',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}
