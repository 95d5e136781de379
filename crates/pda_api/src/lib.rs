use pda_core::error::AppError;
use serde_json::Value;

pub mod client;
pub mod retry;

/// The two read-only PagerDuty calls a poll makes. Both return the reply body verbatim.
pub trait PagerDutyApi {
    fn fetch_incidents(&self) -> Result<Value, AppError>;
    fn fetch_oncalls(&self) -> Result<Value, AppError>;
}
