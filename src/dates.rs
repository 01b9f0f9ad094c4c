//! Resolution of the date tokens accepted by the Logs API form:
//! `today`, `yesterday`, `NdaysAgo` and `YYYY-MM-DD`.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Duration};
use tracing::info;

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

static DAYS_AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)daysAgo$").expect("daysAgo pattern compiles")
});

/// Resolves a date token against `today`.
pub fn resolve(token: &str, today: Date) -> Result<Date, ValidationError> {
    let token = token.trim();
    let invalid = || ValidationError::InvalidDate(token.to_string());

    match token {
        "today" => Ok(today),
        "yesterday" => today.checked_sub(Duration::days(1)).ok_or_else(invalid),
        _ => {
            if let Some(caps) = DAYS_AGO.captures(token) {
                let days: u32 = caps[1].parse().map_err(|_| invalid())?;
                return today
                    .checked_sub(Duration::days(i64::from(days)))
                    .ok_or_else(invalid);
            }
            Date::parse(token, DATE_FORMAT).map_err(|_| invalid())
        }
    }
}

/// Resolves both ends of a range and checks `start <= end`.
pub fn resolve_range(
    date1: &str,
    date2: &str,
    today: Date,
) -> Result<(Date, Date), ValidationError> {
    let start = resolve(date1, today)?;
    let end = resolve(date2, today)?;

    if start > end {
        return Err(ValidationError::DateOrder {
            start: format_date(start),
            end: format_date(end),
        });
    }

    info!("dates valid: {} .. {}", format_date(start), format_date(end));
    Ok((start, end))
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Today's date in the local time zone, falling back to UTC.
pub fn local_today() -> Date {
    time::OffsetDateTime::now_local()
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
        .date()
}
