pub mod alerts;
pub mod config;
pub mod cycle;
pub mod logging;

use pda_core::error::AppError;

/// Output for a run that cannot poll at all, so the host still shows something useful.
pub fn config_error_menu(err: &AppError) -> String {
    format!(
        "📟⚠️\n---\nConfiguration error | color='#FF0000'\n{}\n",
        err.message.replace('|', "¦")
    )
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::config::{config_error_from_clap, Cli};

    #[test]
    fn rejected_command_line_still_renders_a_menu() {
        let err = Cli::try_parse_from(["pagerduty-bar", "--sound", "loud"]).unwrap_err();
        let app = config_error_from_clap(&err).expect("config error");
        let menu = config_error_menu(&app);
        assert!(menu.starts_with("📟⚠️\n---\nConfiguration error | color='#FF0000'\n"));
        assert!(menu.contains("loud"), "{menu}");
    }
}
