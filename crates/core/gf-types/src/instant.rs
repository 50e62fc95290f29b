//! Parsing and formatting of instants.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::fmt::Write;

/// Formats tried, in order, by [`parse_instant`].
const INSTANT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H",
    "%Y-%m-%d",
    "%Y-%m",
    "%Y",
];

/// Parse `input` with a strftime-style `format`.
///
/// Formats that stop short of a full timestamp are accepted: a missing day
/// or month defaults to the first, a missing minute (hour-only formats such
/// as `%Y%m%dT%H`) defaults to zero, and date-only formats yield midnight.
///
/// # Example
///
/// ```
/// use gf_types::parse_datetime;
///
/// let dt = parse_datetime("20240115T06", "%Y%m%dT%H").unwrap();
/// assert_eq!(dt.to_string(), "2024-01-15 06:00:00");
/// ```
pub fn parse_datetime(input: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
        return Some(dt);
    }

    let (input, format) = complete_partial_format(input, format);
    NaiveDateTime::parse_from_str(&input, &format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(&input, &format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn complete_partial_format(input: &str, format: &str) -> (String, String) {
    let mut input = input.to_string();
    let mut completed = format.to_string();
    let has = |spec: &str| format.contains(spec);

    if !has("%j") {
        if !has("%d") && !has("%e") {
            input.push_str("01");
            completed.push_str("%d");
        }
        if !has("%m") && !has("%b") && !has("%B") {
            input.push_str("01");
            completed.push_str("%m");
        }
    }
    if has("%H") && !has("%M") {
        input.push_str("00");
        completed.push_str("%M");
    }
    (input, completed)
}

/// Format an instant with a strftime-style format.
///
/// Returns `None` when the format contains an unsupported specifier.
pub fn format_datetime(instant: &NaiveDateTime, format: &str) -> Option<String> {
    let mut output = String::new();
    write!(output, "{}", instant.format(format)).ok()?;
    Some(output)
}

/// Parse an instant given on a command line or in a configuration file.
///
/// Supported formats:
/// - ISO 8601 / RFC 3339: `2024-01-15T10:30:00Z`, `2024-01-15T10:30:00`
/// - Date only: `2024-01-15`, `2024-01`, `2024` (midnight of the first day)
/// - Relative: `-24h`, `-7d`, `-2w` (hours/days/weeks ago from now)
pub fn parse_instant(input: &str) -> Result<NaiveDateTime, String> {
    let input = input.trim();

    if input.starts_with('-') {
        return parse_relative_instant(input);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    INSTANT_FORMATS
        .iter()
        .find_map(|format| parse_datetime(input, format))
        .ok_or_else(|| {
            format!(
                "Invalid date format: {input}. Expected ISO 8601 (2024-01-15T10:30:00), \
                 date only (2024-01-15), or relative (-24h, -7d, -2w)"
            )
        })
}

fn parse_relative_instant(input: &str) -> Result<NaiveDateTime, String> {
    let input = input.trim_start_matches('-');
    let Some(unit) = input.chars().last() else {
        return Err("Empty relative date".to_string());
    };
    let amount: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| format!("Invalid relative date amount: -{input}"))?;

    let duration = match unit {
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        'w' => Duration::try_weeks(amount),
        _ => {
            return Err(format!(
                "Invalid relative date unit '{unit}'. Expected h (hours), d (days), or w (weeks)"
            ));
        }
    }
    .ok_or_else(|| format!("Relative date out of range: -{input}"))?;

    Utc::now()
        .naive_utc()
        .checked_sub_signed(duration)
        .ok_or_else(|| format!("Relative date out of range: -{input}"))
}
