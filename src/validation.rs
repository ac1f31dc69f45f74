//! Field-level validation helpers shared by the backend handlers and the API client
//!
//! Length and range rules are declared on the DTOs with `validator`; the helpers
//! here cover what the derive cannot express: date parsing, the date-in-future
//! rule and enum membership.

use crate::entities::{EventStatus, EventType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Inclusive bounds of `max_attendees` when a limit is set (0 stays "unlimited").
pub const MAX_ATTENDEES_LIMIT: i32 = 10_000;

/// Parses a date/time as sent by the event form.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) and a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_event_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Accepts `input` only if it is a valid date strictly later than `now`.
///
/// `now` is sampled once by the caller at submission time; nothing re-checks it later.
pub fn check_event_date(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    if input.trim().is_empty() {
        return Err(error("required", "Event date is required"));
    }
    let date = parse_event_date(input).ok_or_else(|| error("date", "Invalid date format"))?;
    check_future(date, now)?;
    Ok(date)
}

pub fn check_future(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if date > now {
        Ok(())
    } else {
        Err(error("future", "Event date must be in the future"))
    }
}

pub fn check_event_type(input: &str) -> Result<EventType, ValidationError> {
    input
        .parse()
        .map_err(|_| error("event_type", "Valid event type is required"))
}

pub fn check_event_status(input: &str) -> Result<EventStatus, ValidationError> {
    input
        .parse()
        .map_err(|_| error("status", "Status must be one of draft, published, cancelled"))
}

pub fn check_not_blank(input: &str, message: &'static str) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        Err(error("required", message))
    } else {
        Ok(())
    }
}

/// Records `result`'s error under `field`, passing the value through on success.
pub fn collect<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.add(field, e);
            None
        }
    }
}

/// Flattens `validator` errors into one message per field, the shape the UI shows.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(list) => list.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            }),
            _ => None,
        })
        .collect()
}

/// Joins the per-field messages into a single human readable line.
pub fn summary(errors: &ValidationErrors) -> String {
    field_messages(errors)
        .into_iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut e = ValidationError::new(code);
    e.message = Some(Cow::Borrowed(message));
    e
}
