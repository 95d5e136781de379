use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes shared by the core, the API client and the menu-bar binary.
pub mod codes {
    pub const PD_UNAUTHORIZED: &str = "PD_UNAUTHORIZED";
    pub const PD_SERVER_ERROR: &str = "PD_SERVER_ERROR";
    pub const PD_UNKNOWN_RESPONSE: &str = "PD_UNKNOWN_RESPONSE";
    pub const PD_UNREACHABLE: &str = "PD_UNREACHABLE";
    pub const PD_DECODE_FAILED: &str = "PD_DECODE_FAILED";

    pub const STORE_WRITE_FAILED: &str = "STORE_WRITE_FAILED";
    pub const STORE_ENCODE_FAILED: &str = "STORE_ENCODE_FAILED";

    pub const CONFIG_INVALID_TIME_ZONE: &str = "CONFIG_INVALID_TIME_ZONE";
    pub const CONFIG_INVALID_DATE_FORMAT: &str = "CONFIG_INVALID_DATE_FORMAT";
    pub const CONFIG_MISSING_VALUE: &str = "CONFIG_MISSING_VALUE";
    pub const CONFIG_INVALID_ARGUMENT: &str = "CONFIG_INVALID_ARGUMENT";

    pub const TIME_FORMAT_FAILED: &str = "TIME_FORMAT_FAILED";
}

/// Single structured error shape used by every layer, from the HTTP fetch to the renderer.
///
/// `message` is what ends up on the menu when a fetch degrades to stale data, so it should
/// read well on its own; `details` carries the technical context for logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
