use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::core::primitives::TimePoint;
use crate::error::{TimelineError, TimelineResult};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%a %b %d %Y",
];

const BCE_SUFFIXES: &[&str] = &["BCE", "B.C.E.", "BC", "B.C."];
const CE_AFFIXES: &[&str] = &["CE", "C.E.", "AD", "A.D."];

/// Parses a timeline date string into an absolute instant.
///
/// Accepted inputs, tried in order:
/// - signed integer years (`"1999"`, `"-500"`), interpreted as January 1st of
///   that astronomical year
/// - era-qualified years (`"44 BC"`, `"AD 79"`); `1 BC` is astronomical year `0`
/// - signed ISO dates with expanded years (`"-0500-03-15"`, `"2020-01"`)
/// - RFC 3339 / ISO-8601 date-times with or without offsets (naive values are UTC)
/// - RFC 2822
/// - a handful of textual formats (`"Jan 5 2020"`, `"5 January 2020"`, `"01/05/2020"`)
pub fn parse_time_point(input: &str) -> TimelineResult<TimePoint> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input));
    }

    if let Some(year) = parse_signed_integer(trimmed) {
        return TimePoint::from_year(year).map_err(|_| invalid(input));
    }
    if let Some(year) = parse_era_year(trimmed) {
        return TimePoint::from_year(year).map_err(|_| invalid(input));
    }
    if let Some(result) = parse_signed_iso_date(trimmed) {
        return result.map_err(|_| invalid(input));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(TimePoint::from_millis(parsed.timestamp_millis()));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(TimePoint::from_millis(parsed.and_utc().timestamp_millis()));
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(TimePoint::from_millis(parsed.timestamp_millis()));
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = parsed.and_hms_opt(0, 0, 0).ok_or_else(|| invalid(input))?;
            return Ok(TimePoint::from_millis(midnight.and_utc().timestamp_millis()));
        }
    }

    Err(invalid(input))
}

fn invalid(input: &str) -> TimelineError {
    TimelineError::InvalidDate {
        input: input.to_owned(),
    }
}

fn parse_signed_integer(value: &str) -> Option<i64> {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}

fn parse_era_year(value: &str) -> Option<i64> {
    let upper = value.to_ascii_uppercase();

    for suffix in BCE_SUFFIXES {
        if let Some(rest) = upper.strip_suffix(suffix) {
            let year = parse_unsigned_year(rest.trim())?;
            if year == 0 {
                return None;
            }
            return Some(1 - year);
        }
    }

    for affix in CE_AFFIXES {
        let rest = upper
            .strip_suffix(affix)
            .or_else(|| upper.strip_prefix(affix));
        if let Some(rest) = rest {
            let year = parse_unsigned_year(rest.trim())?;
            if year == 0 {
                return None;
            }
            return Some(year);
        }
    }

    None
}

fn parse_unsigned_year(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}

/// Handles `[+-]Y...-MM[-DD]`, which chrono's four-digit `%Y` parsers reject
/// for expanded or negative years.
fn parse_signed_iso_date(value: &str) -> Option<TimelineResult<TimePoint>> {
    let (sign, body) = match value.as_bytes().first()? {
        b'-' => (-1, &value[1..]),
        b'+' => (1, &value[1..]),
        _ => (1, value),
    };

    let mut parts = body.split('-');
    let year_part = parts.next()?;
    let month_part = parts.next()?;
    let day_part = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(year_part) || !all_digits(month_part) || month_part.len() > 2 {
        return None;
    }
    if day_part.is_some_and(|day| !all_digits(day) || day.len() > 2) {
        return None;
    }

    let year = year_part.parse::<i64>().ok()? * sign;
    let month = month_part.parse::<u32>().ok()?;
    let day = match day_part {
        Some(day) => day.parse::<u32>().ok()?,
        None => 1,
    };
    Some(TimePoint::from_ymd(year, month, day))
}
