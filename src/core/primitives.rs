use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Largest absolute year accepted by civil constructors.
///
/// Keeps every representable civil date inside `i64` milliseconds with headroom
/// for pan arithmetic.
pub const MAX_ABS_YEAR: i64 = 200_000_000;

/// Absolute instant as signed milliseconds since 1970-01-01T00:00:00Z.
///
/// Civil conversions use the proleptic Gregorian calendar with astronomical
/// year numbering (year `0` is 1 BC, year `-1` is 2 BC).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimePoint(i64);

/// Broken-down civil representation of a [`TimePoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl TimePoint {
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// Rounds fractional milliseconds to the nearest instant.
    ///
    /// Returns `None` for non-finite input or values outside `i64`.
    #[must_use]
    pub fn from_f64_millis(millis: f64) -> Option<Self> {
        if !millis.is_finite() {
            return None;
        }
        let rounded = millis.round();
        if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
            return None;
        }
        Some(Self(rounded as i64))
    }

    /// Same as [`Self::from_f64_millis`] but saturates instead of failing.
    #[must_use]
    pub fn saturating_from_f64_millis(millis: f64) -> Self {
        if millis.is_nan() {
            return Self(0);
        }
        Self::from_f64_millis(millis).unwrap_or(if millis < 0.0 { Self::MIN } else { Self::MAX })
    }

    #[must_use]
    pub fn saturating_add_millis(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    pub fn from_ymd(year: i64, month: u32, day: u32) -> TimelineResult<Self> {
        Self::from_ymd_hms_milli(year, month, day, 0, 0, 0, 0)
    }

    /// January 1st, 00:00 of the given astronomical year.
    pub fn from_year(year: i64) -> TimelineResult<Self> {
        Self::from_ymd(year, 1, 1)
    }

    pub fn from_ymd_hms_milli(
        year: i64,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> TimelineResult<Self> {
        if year.abs() > MAX_ABS_YEAR {
            return Err(TimelineError::InvalidData(format!(
                "year {year} exceeds supported range of +/-{MAX_ABS_YEAR}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(TimelineError::InvalidData(format!(
                "month must be in 1..=12, got {month}"
            )));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(TimelineError::InvalidData(format!(
                "day {day} is not valid for {year}-{month:02}"
            )));
        }
        if hour > 23 || minute > 59 || second > 59 || millisecond > 999 {
            return Err(TimelineError::InvalidData(
                "time of day components out of range".to_owned(),
            ));
        }

        let days = days_from_civil(year, month, day);
        let millis = days * MS_PER_DAY
            + i64::from(hour) * MS_PER_HOUR
            + i64::from(minute) * MS_PER_MINUTE
            + i64::from(second) * MS_PER_SECOND
            + i64::from(millisecond);
        Ok(Self(millis))
    }

    #[must_use]
    pub fn civil(self) -> CivilDateTime {
        let days = self.0.div_euclid(MS_PER_DAY);
        let ms_of_day = self.0.rem_euclid(MS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        CivilDateTime {
            year,
            month,
            day,
            hour: (ms_of_day / MS_PER_HOUR) as u32,
            minute: ((ms_of_day % MS_PER_HOUR) / MS_PER_MINUTE) as u32,
            second: ((ms_of_day % MS_PER_MINUTE) / MS_PER_SECOND) as u32,
            millisecond: (ms_of_day % MS_PER_SECOND) as u32,
        }
    }

    #[must_use]
    pub fn year(self) -> i64 {
        self.civil().year
    }

    /// Days elapsed since 1970-01-01 (floor division, negative before epoch).
    #[must_use]
    pub fn days_since_epoch(self) -> i64 {
        self.0.div_euclid(MS_PER_DAY)
    }

    #[must_use]
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        Self(time.timestamp_millis())
    }

    /// Converts to `chrono` when the instant fits its supported range.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl From<DateTime<Utc>> for TimePoint {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(value)
    }
}

#[must_use]
pub fn is_leap_year(year: i64) -> bool {
    year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
}

#[must_use]
pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days from 1970-01-01 to the given proleptic Gregorian date.
#[must_use]
pub(crate) fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let month = i64::from(month);
    let day = i64::from(day);
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let shifted_month = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * shifted_month + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

#[must_use]
pub(crate) fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let shifted = days + 719_468;
    let era = shifted.div_euclid(146_097);
    let day_of_era = shifted - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * shifted_month + 2) / 5 + 1) as u32;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    } as u32;
    let year = year_of_era + era * 400;
    (if month <= 2 { year + 1 } else { year }, month, day)
}
