use std::fmt;

use time::format_description::{self, OwnedFormatItem};
use time::{OffsetDateTime, PrimitiveDateTime};
use time_tz::{timezones, Offset, OffsetDateTimeExt, TimeZone, Tz};

use crate::error::{codes, AppError};

/// The only timestamp shape the on-call API emits, always UTC.
pub const PAGERDUTY_UTC_FORMAT: &str = "[year]-[month]-[day]T[hour]:[minute]:[second]Z";

/// Default display format, a 12-hour clock in US order.
pub const DEFAULT_DATE_FORMAT: &str =
    "[month]/[day]/[year] [hour repr:12]:[minute]:[second][period]";

pub const DEFAULT_TIME_ZONE: &str = "America/Los_Angeles";

/// Parse `YYYY-MM-DDTHH:MM:SSZ` strictly. Offsets other than the literal `Z` are rejected.
pub fn parse_pagerduty_utc(raw: &str) -> Result<OffsetDateTime, AppError> {
    let items = format_description::parse(PAGERDUTY_UTC_FORMAT).map_err(|e| {
        AppError::new(codes::TIME_FORMAT_FAILED, "PagerDuty timestamp format is invalid")
            .with_details(e.to_string())
    })?;
    let pdt = PrimitiveDateTime::parse(raw.trim(), &items).map_err(|e| {
        AppError::new(codes::TIME_FORMAT_FAILED, "Unparseable PagerDuty timestamp")
            .with_details(format!("value={raw}; err={e}"))
    })?;
    Ok(pdt.assume_utc())
}

/// Compiled display settings: a date format plus the IANA zone local times are shown in.
#[derive(Clone)]
pub struct TimeDisplay {
    format: OwnedFormatItem,
    zone: &'static Tz,
}

impl fmt::Debug for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeDisplay")
            .field("zone", &self.zone.name())
            .finish_non_exhaustive()
    }
}

impl TimeDisplay {
    pub fn new(date_format: &str, time_zone: &str) -> Result<Self, AppError> {
        let format = format_description::parse_owned::<1>(date_format).map_err(|e| {
            AppError::new(codes::CONFIG_INVALID_DATE_FORMAT, "Date format is invalid")
                .with_details(format!("format={date_format}; err={e}"))
        })?;
        let zone = timezones::get_by_name(time_zone).ok_or_else(|| {
            AppError::new(codes::CONFIG_INVALID_TIME_ZONE, "Unknown time zone")
                .with_details(format!("time_zone={time_zone}"))
        })?;
        Ok(Self { format, zone })
    }

    pub fn zone_name(&self) -> &str {
        self.zone.name()
    }

    /// `instant` rendered in UTC, suffixed with `UTC`.
    pub fn format_utc(&self, instant: OffsetDateTime) -> Result<String, AppError> {
        let utc = instant.to_offset(time::UtcOffset::UTC);
        Ok(format!("{} UTC", self.format_with(utc)?))
    }

    /// `instant` converted to the configured zone (DST aware), suffixed with the zone abbreviation.
    pub fn format_local(&self, instant: OffsetDateTime) -> Result<String, AppError> {
        let local = instant.to_timezone(self.zone);
        let offset = self.zone.get_offset_utc(&instant);
        Ok(format!("{} {}", self.format_with(local)?, offset.name()))
    }

    fn format_with(&self, dt: OffsetDateTime) -> Result<String, AppError> {
        dt.format(&self.format).map_err(|e| {
            AppError::new(codes::TIME_FORMAT_FAILED, "Failed to format timestamp")
                .with_details(format!("value={dt}; err={e}"))
        })
    }
}
