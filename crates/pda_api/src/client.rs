use std::time::Duration;

use pda_core::error::{codes, AppError};
use serde_json::Value;

use crate::retry::RetryPolicy;
use crate::PagerDutyApi;

pub const DEFAULT_API_BASE: &str = "https://api.pagerduty.com";
const ACCEPT: &str = "application/vnd.pagerduty+json;version=2";
const INCIDENTS_PAGE_SIZE: &str = "50";

/// Map a non-2xx status to the error the menu shows.
pub fn error_for_status(status: u16) -> AppError {
    match status {
        400..=499 => AppError::new(
            codes::PD_UNAUTHORIZED,
            format!("{status}: Unauthorized, please double check that your Dev Token is valid."),
        ),
        500..=599 => AppError::new(
            codes::PD_SERVER_ERROR,
            format!("{status}: A 5xx server error occurred, please retry the request."),
        )
        .with_retryable(true),
        _ => AppError::new(
            codes::PD_UNKNOWN_RESPONSE,
            format!("{status}: An unknown error has occurred."),
        ),
    }
    .with_details(format!("status={status}"))
}

#[derive(Debug, Clone)]
pub struct HttpPagerDuty {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    user_id: String,
    retry: RetryPolicy,
    sleeper: fn(Duration),
}

impl HttpPagerDuty {
    pub fn new(base_url: &str, token: &str, user_id: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            user_id: user_id.to_string(),
            retry: RetryPolicy::default(),
            sleeper: std::thread::sleep,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: fn(Duration)) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = format!("{}{path}", self.base_url);
        let sleeper = self.sleeper;
        let mut sleep = |d: Duration| sleeper(d);
        self.retry.run(&mut sleep, |attempt| {
            tracing::debug!(%url, attempt, "GET");
            let mut req = self
                .agent
                .get(&url)
                .set("Accept", ACCEPT)
                .set("Authorization", &format!("Token token={}", self.token))
                .set("Content-Type", "application/json");
            for (k, v) in query {
                req = req.query(k, v);
            }

            match req.call() {
                Ok(r) if (200..300).contains(&r.status()) => r.into_json::<Value>().map_err(|e| {
                    AppError::new(codes::PD_DECODE_FAILED, "Failed to decode PagerDuty reply")
                        .with_details(e.to_string())
                }),
                Ok(r) => Err(error_for_status(r.status())),
                Err(ureq::Error::Status(status, _)) => Err(error_for_status(status)),
                Err(ureq::Error::Transport(t)) => Err(AppError::new(
                    codes::PD_UNREACHABLE,
                    "An unknown error has occurred.",
                )
                .with_details(t.to_string())),
            }
        })
    }
}

impl PagerDutyApi for HttpPagerDuty {
    fn fetch_incidents(&self) -> Result<Value, AppError> {
        self.get_json(
            "/incidents",
            &[
                ("user_ids[]", self.user_id.as_str()),
                ("limit", INCIDENTS_PAGE_SIZE),
                ("statuses[]", "triggered"),
                ("statuses[]", "acknowledged"),
            ],
        )
    }

    fn fetch_oncalls(&self) -> Result<Value, AppError> {
        self.get_json("/oncalls", &[("user_ids[]", self.user_id.as_str())])
    }
}
