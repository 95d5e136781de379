use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use pda_api::client::DEFAULT_API_BASE;
use pda_core::error::{codes, AppError};
use pda_core::normalize::timestamps::{TimeDisplay, DEFAULT_DATE_FORMAT, DEFAULT_TIME_ZONE};
use pda_core::render::{AccountLinks, Glyphs, MenuRenderer, Palette};

/// Every flag has an environment variable so menu-bar hosts can pass plugin variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pagerduty-bar",
    version,
    about = "PagerDuty incidents and on-call status for menu-bar plugin hosts"
)]
pub struct Cli {
    /// Account subdomain, as in <company>.pagerduty.com
    #[arg(long, env = "PD_BAR_COMPANY")]
    pub company: Option<String>,

    /// REST API token
    #[arg(long, env = "PD_BAR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// PagerDuty user id whose incidents and on-call shifts are shown
    #[arg(long, env = "PD_BAR_USER")]
    pub user: Option<String>,

    /// `time` format description used for every displayed timestamp
    #[arg(long, env = "PD_BAR_DATE_FORMAT", default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// IANA zone local times are shown in
    #[arg(long, env = "PD_BAR_TIME_ZONE", default_value = DEFAULT_TIME_ZONE)]
    pub time_zone: String,

    #[arg(
        long,
        env = "PD_BAR_POPUPS",
        action = ArgAction::Set,
        default_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub popups: bool,

    #[arg(
        long,
        env = "PD_BAR_SOUND",
        action = ArgAction::Set,
        default_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub sound: bool,

    /// Audio file played when a high-urgency incident starts triggering
    #[arg(long, env = "PD_BAR_ALERT_SOUND")]
    pub alert_sound: Option<PathBuf>,

    /// Where the last incidents reply is kept between runs
    #[arg(long, env = "PD_BAR_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[arg(long, env = "PD_BAR_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// tracing filter directive; logs go to stderr
    #[arg(long, env = "PD_BAR_LOG", default_value = "warn")]
    pub log_level: String,
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub links: AccountLinks,
    pub token: String,
    pub time_display: TimeDisplay,
    pub popups_enabled: bool,
    pub sound_enabled: bool,
    pub alert_sound: Option<PathBuf>,
    pub state_file: PathBuf,
    pub api_base: String,
    pub palette: Palette,
    pub glyphs: Glyphs,
}

fn required(value: Option<String>, flag: &str, env: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::new(
            codes::CONFIG_MISSING_VALUE,
            format!("Missing --{flag} (or {env})"),
        )),
    }
}

/// Map a rejected command line to a configuration error. Help and version requests are not
/// errors and yield `None`; clap prints those itself.
pub fn config_error_from_clap(err: &clap::Error) -> Option<AppError> {
    let code = match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => return None,
        ErrorKind::MissingRequiredArgument => codes::CONFIG_MISSING_VALUE,
        _ => codes::CONFIG_INVALID_ARGUMENT,
    };
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("Invalid command line")
        .trim_start_matches("error: ")
        .to_string();
    Some(AppError::new(code, message).with_details(rendered.trim_end().to_string()))
}

pub fn default_state_file() -> PathBuf {
    match dirs::cache_dir() {
        Some(dir) => dir.join("pagerduty-bar").join("last_reply.json"),
        None => PathBuf::from("pagerduty_alerts.lastreply"),
    }
}

pub fn default_alert_sound() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("my_alert_sound.mp3"))
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, AppError> {
        let company = required(cli.company, "company", "PD_BAR_COMPANY")?;
        let token = required(cli.token, "token", "PD_BAR_TOKEN")?;
        let user = required(cli.user, "user", "PD_BAR_USER")?;
        let time_display = TimeDisplay::new(&cli.date_format, &cli.time_zone)?;

        Ok(Self {
            links: AccountLinks { company, user },
            token,
            time_display,
            popups_enabled: cli.popups,
            sound_enabled: cli.sound,
            alert_sound: cli.alert_sound.or_else(default_alert_sound),
            state_file: cli.state_file.unwrap_or_else(default_state_file),
            api_base: cli.api_base,
            palette: Palette::default(),
            glyphs: Glyphs::default(),
        })
    }

    pub fn renderer(&self) -> MenuRenderer {
        MenuRenderer::new(self.palette.clone(), self.glyphs.clone(), self.links.clone())
    }
}
