use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use pagerduty_bar_lib::alerts::AlertBackend;
use pagerduty_bar_lib::config::{config_error_from_clap, Cli, Settings};
use pagerduty_bar_lib::cycle::run_cycle;
use pagerduty_bar_lib::{config_error_menu, logging};
use pda_api::client::HttpPagerDuty;
use pda_core::store::SnapshotStore;
use time::OffsetDateTime;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match config_error_from_clap(&e) {
            Some(err) => {
                let _ = e.print();
                print!("{}", config_error_menu(&err));
                return ExitCode::FAILURE;
            }
            None => e.exit(),
        },
    };
    logging::init(&cli.log_level);

    let settings = match Settings::from_cli(cli) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(code = %e.code, details = ?e.details, "{}", e.message);
            print!("{}", config_error_menu(&e));
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        commit = option_env!("GIT_COMMIT_HASH").unwrap_or("unknown"),
        time_zone = settings.time_display.zone_name(),
        state_file = %settings.state_file.display(),
        "starting poll"
    );

    let backend = AlertBackend::detect();
    let api = HttpPagerDuty::new(&settings.api_base, &settings.token, &settings.links.user);
    let store = SnapshotStore::new(&settings.state_file);
    tracing::debug!(api = api.base_url(), "polling PagerDuty");

    let report = run_cycle(&settings, &api, &store, OffsetDateTime::now_utc());

    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(report.menu.as_bytes());
    let _ = stdout.flush();
    drop(stdout);

    for popup in &report.popups {
        backend.notify(popup);
    }

    // Last: playback blocks until the clip ends.
    if report.play_sound {
        if let Some(sound) = settings.alert_sound.as_deref() {
            backend.play_sound(sound);
        }
    }

    ExitCode::SUCCESS
}
