use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use pda_core::diff::Notification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupAction {
    pub label: String,
    pub url: String,
}

/// One OS notification, independent of the menu text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub action: Option<PopupAction>,
    pub sound: bool,
}

impl Popup {
    pub fn from_notification(n: &Notification, sound: bool) -> Self {
        Self {
            title: n.headline(),
            subtitle: String::new(),
            body: n.body(),
            action: Some(PopupAction {
                label: "Open URL".to_string(),
                url: n.html_url.clone(),
            }),
            sound,
        }
    }

    /// Neither helper can attach a clickable button without blocking, so the action is
    /// appended to the text instead.
    fn text(&self) -> String {
        match &self.action {
            Some(a) => format!("{}\n\n{}: {}", self.body, a.label, a.url),
            None => self.body.clone(),
        }
    }
}

/// Popup and sound capability, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertBackend {
    MacOs {
        osascript: Option<PathBuf>,
        afplay: Option<PathBuf>,
    },
    Linux {
        notify_send: Option<PathBuf>,
        play: Option<PathBuf>,
    },
    None,
}

impl AlertBackend {
    pub fn detect() -> Self {
        let backend = if cfg!(target_os = "macos") {
            Self::MacOs {
                osascript: find_in_path("osascript"),
                afplay: find_in_path("afplay"),
            }
        } else if cfg!(target_os = "linux") {
            Self::Linux {
                notify_send: find_in_path("notify-send"),
                // sox
                play: find_in_path("play"),
            }
        } else {
            Self::None
        };
        tracing::debug!(?backend, "alert backend");
        backend
    }

    /// Best effort; failures are logged and otherwise ignored.
    pub fn notify(&self, popup: &Popup) {
        match self {
            Self::MacOs {
                osascript: Some(osascript),
                ..
            } => {
                let mut script = format!(
                    "display notification {} with title {} subtitle {}",
                    applescript_string(&popup.text()),
                    applescript_string(&popup.title),
                    applescript_string(&popup.subtitle),
                );
                if popup.sound {
                    script.push_str(" sound name \"Glass\"");
                }
                run_quietly(osascript, ["-e", script.as_str()]);
            }
            Self::Linux {
                notify_send: Some(notify_send),
                ..
            } => {
                let title = if popup.subtitle.is_empty() {
                    popup.title.clone()
                } else {
                    format!("{} - {}", popup.title, popup.subtitle)
                };
                let body = popup.text();
                run_quietly(
                    notify_send,
                    ["--app-name=pagerduty-bar", title.as_str(), body.as_str()],
                );
            }
            _ => tracing::debug!(title = %popup.title, "no popup facility; skipped"),
        }
    }

    /// Blocks until playback ends. Missing files and players are silently skipped.
    pub fn play_sound(&self, file: &Path) {
        if !file.is_file() {
            tracing::debug!(path = %file.display(), "alert sound not found");
            return;
        }
        match self {
            Self::MacOs {
                afplay: Some(player),
                ..
            }
            | Self::Linux {
                play: Some(player),
                ..
            } => run_quietly(player, [file.as_os_str()]),
            _ => tracing::debug!("no sound player; skipped"),
        }
    }
}

fn run_quietly<I, S>(program: &Path, args: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(s) if s.success() => {}
        Ok(s) => tracing::debug!(program = %program.display(), status = %s, "helper failed"),
        Err(e) => tracing::debug!(program = %program.display(), err = %e, "helper did not start"),
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn applescript_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applescript_strings_are_escaped() {
        assert_eq!(applescript_string(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn popup_text_carries_action_link() {
        let popup = Popup {
            title: "t".to_string(),
            subtitle: String::new(),
            body: "body".to_string(),
            action: Some(PopupAction {
                label: "Open URL".to_string(),
                url: "https://acme.pagerduty.com/incidents/P1".to_string(),
            }),
            sound: false,
        };
        assert_eq!(
            popup.text(),
            "body\n\nOpen URL: https://acme.pagerduty.com/incidents/P1"
        );
    }

    #[test]
    fn none_backend_swallows_everything() {
        let popup = Popup {
            title: "t".to_string(),
            subtitle: String::new(),
            body: "b".to_string(),
            action: None,
            sound: true,
        };
        AlertBackend::None.notify(&popup);
        AlertBackend::None.play_sound(Path::new("/definitely/not/here.mp3"));
    }
}
