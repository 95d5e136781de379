use pda_api::PagerDutyApi;
use pda_core::diff::{diff, DiffOutcome};
use pda_core::domain::ValidationWarning;
use pda_core::error::AppError;
use pda_core::normalize::normalize_optional;
use pda_core::oncall::{resolve_oncall, OnCallWindow};
use pda_core::render::MenuState;
use pda_core::store::SnapshotStore;
use time::OffsetDateTime;

use crate::alerts::Popup;
use crate::config::Settings;

/// What one poll produced. The caller prints `menu`, then shows `popups`, then plays the sound.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub menu: String,
    pub popups: Vec<Popup>,
    pub play_sound: bool,
    /// The incidents fetch failed and the persisted reply was shown instead.
    pub stale: Option<AppError>,
    pub oncall_error: Option<AppError>,
    /// The fresh reply was written to the snapshot store.
    pub saved: bool,
    pub warnings: Vec<ValidationWarning>,
}

/// One full poll: fetch, compare with the persisted reply, render, persist.
///
/// Never fails: fetch errors degrade to an inactive on-call section or stale incident data,
/// and the store is only written after a successful incidents fetch.
pub fn run_cycle(
    settings: &Settings,
    api: &dyn PagerDutyApi,
    store: &SnapshotStore,
    now: OffsetDateTime,
) -> CycleReport {
    let mut warnings = Vec::new();

    let (oncall, oncall_error) = match api.fetch_oncalls() {
        Ok(raw) => {
            let (window, w) = resolve_oncall(&raw, &settings.time_display);
            warnings.extend(w);
            (window, None)
        }
        Err(e) => {
            tracing::warn!(code = %e.code, details = ?e.details, "on-call fetch failed");
            (OnCallWindow::inactive(), Some(e))
        }
    };

    let previous_raw = store.load();
    let (current_raw, stale) = match api.fetch_incidents() {
        Ok(raw) => (Some(raw), None),
        Err(e) => {
            tracing::warn!(code = %e.code, details = ?e.details, "incidents fetch failed; showing stale data");
            (previous_raw.clone(), Some(e))
        }
    };

    let (previous, w) = normalize_optional(previous_raw);
    warnings.extend(w);
    let (current, w) = normalize_optional(current_raw);
    warnings.extend(w);
    for w in &warnings {
        tracing::warn!(code = %w.code, details = ?w.details, "{}", w.message);
    }

    let DiffOutcome {
        notifications,
        should_play_sound,
    } = diff(&current, &previous);

    let popups = if settings.popups_enabled {
        notifications
            .iter()
            .map(|n| Popup::from_notification(n, settings.sound_enabled))
            .collect()
    } else {
        Vec::new()
    };
    let play_sound = should_play_sound && settings.sound_enabled && settings.alert_sound.is_some();

    let menu = settings.renderer().render(&MenuState {
        incidents: &current,
        oncall: &oncall,
        oncall_error: oncall_error.as_ref(),
        stale: stale.as_ref(),
        now,
    });

    let mut saved = false;
    if stale.is_none() {
        if let Some(raw) = current.raw.as_ref() {
            match store.save(raw) {
                Ok(()) => saved = true,
                Err(e) => tracing::warn!(code = %e.code, details = ?e.details, "{}", e.message),
            }
        }
    }

    CycleReport {
        menu,
        popups,
        play_sound,
        stale,
        oncall_error,
        saved,
        warnings,
    }
}
