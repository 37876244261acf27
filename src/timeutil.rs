//! Timestamp helpers
//!
//! Precision normalization for API timestamps, local-midnight conversion and
//! the default request window derived from an account tier.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClientError, ClientResult};

/// Output precision for [`convert_datetime_precision`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Day,
    Hour,
    Minute,
    Second,
}

impl Precision {
    /// Single-letter code: `d`, `h`, `M`, `s`. Case matters (`M` is minute).
    pub fn from_code(code: &str) -> ClientResult<Self> {
        match code {
            "d" => Ok(Precision::Day),
            "h" => Ok(Precision::Hour),
            "M" => Ok(Precision::Minute),
            "s" => Ok(Precision::Second),
            other => Err(ClientError::InvalidPrecision(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Precision::Day => "d",
            Precision::Hour => "h",
            Precision::Minute => "M",
            Precision::Second => "s",
        }
    }

    pub fn format_str(&self) -> &'static str {
        match self {
            Precision::Day => "%Y-%m-%d",
            Precision::Hour => "%Y-%m-%d %H",
            Precision::Minute => "%Y-%m-%d %H:%M",
            Precision::Second => "%Y-%m-%d %H:%M:%S",
        }
    }

    pub fn format(&self, dt: &NaiveDateTime) -> String {
        dt.format(self.format_str()).to_string()
    }
}

impl FromStr for Precision {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Precision::from_code(s)
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Anything the precision normalizer accepts
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampInput<'a> {
    Text(&'a str),
    DateTime(NaiveDateTime),
}

impl<'a> From<&'a str> for TimestampInput<'a> {
    fn from(s: &'a str) -> Self {
        TimestampInput::Text(s)
    }
}

impl From<NaiveDateTime> for TimestampInput<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        TimestampInput::DateTime(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimestampInput<'_> {
    fn from(dt: DateTime<Tz>) -> Self {
        TimestampInput::DateTime(dt.naive_local())
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an API timestamp string.
///
/// RFC 3339 strings keep the wall-clock time of their own offset, so
/// `2021-01-01T00:00:00+02:00` parses to midnight, not 22:00 UTC.
pub fn parse_timestamp(s: &str) -> ClientResult<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ClientError::InvalidTimestamp(s.to_string()))
}

/// Render a timestamp at the precision selected by `code` (`d`, `h`, `M`, `s`)
pub fn convert_datetime_precision<'a>(
    timestamp: impl Into<TimestampInput<'a>>,
    code: &str,
) -> ClientResult<String> {
    let precision = Precision::from_code(code)?;
    let dt = match timestamp.into() {
        TimestampInput::Text(s) => parse_timestamp(s)?,
        TimestampInput::DateTime(dt) => dt,
    };
    Ok(precision.format(&dt))
}

/// Step used to walk past a DST gap at midnight
const GAP_STEP_MINUTES: i64 = 15;

/// Longest gap walked before giving up
const MAX_GAP_MINUTES: i64 = 180;

/// Unix timestamp of local midnight on `date`.
///
/// Where the clocks skip midnight (DST starting at 00:00) the result is the
/// first valid local instant after the gap, as `mktime` does. On an ambiguous
/// midnight the earlier instant wins.
pub fn convert_to_day_begin(date: NaiveDate) -> ClientResult<i64> {
    day_begin_in(&Local, date)
}

pub(crate) fn day_begin_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> ClientResult<i64> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ClientError::InvalidDate(date.to_string()))?;

    (0..=MAX_GAP_MINUTES / GAP_STEP_MINUTES)
        .map(|step| midnight + Duration::minutes(step * GAP_STEP_MINUTES))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.timestamp())
        .ok_or_else(|| ClientError::InvalidDate(format!("{} has no local midnight", date)))
}

/// Day-aligned request window in Unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    /// Window ending at the start of `today` and reaching back `lookback_days`
    pub fn lookback_from(today: NaiveDate, lookback_days: u32) -> ClientResult<Self> {
        let start_day = today - Duration::days(i64::from(lookback_days));
        Ok(DateRange {
            start: convert_to_day_begin(start_day)?,
            end: convert_to_day_begin(today)?,
        })
    }

    /// Same as [`DateRange::lookback_from`] using the local calendar date
    pub fn lookback_from_today(lookback_days: u32) -> ClientResult<Self> {
        Self::lookback_from(Local::now().date_naive(), lookback_days)
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, Timelike};

    #[test]
    fn test_precision_codes() {
        assert_eq!(Precision::from_code("d").unwrap(), Precision::Day);
        assert_eq!(Precision::from_code("h").unwrap(), Precision::Hour);
        assert_eq!(Precision::from_code("M").unwrap(), Precision::Minute);
        assert_eq!(Precision::from_code("s").unwrap(), Precision::Second);
        assert!(Precision::from_code("m").is_err());
        assert!(Precision::from_code("").is_err());
        assert_eq!("h".parse::<Precision>().unwrap().to_string(), "h");
    }

    #[test]
    fn test_precision_lengths_increase() {
        let ts = "2021-03-04T05:06:07.000Z";
        let lengths: Vec<usize> = ["d", "h", "M", "s"]
            .iter()
            .map(|c| convert_datetime_precision(ts, c).unwrap().len())
            .collect();

        assert!(lengths.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(convert_datetime_precision(ts, "d").unwrap(), "2021-03-04");
        assert_eq!(convert_datetime_precision(ts, "h").unwrap(), "2021-03-04 05");
        assert_eq!(convert_datetime_precision(ts, "M").unwrap(), "2021-03-04 05:06");
        assert_eq!(
            convert_datetime_precision(ts, "s").unwrap(),
            "2021-03-04 05:06:07"
        );
    }

    #[test]
    fn test_unknown_code_is_error() {
        let err = convert_datetime_precision("2021-01-01T00:00:00Z", "y").unwrap_err();
        assert!(matches!(err, ClientError::InvalidPrecision(ref c) if c == "y"));
    }

    #[test]
    fn test_datetime_input() {
        let dt = NaiveDate::from_ymd_opt(2020, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap();
        assert_eq!(convert_datetime_precision(dt, "h").unwrap(), "2020-12-31 23");
        assert_eq!(
            convert_datetime_precision(dt.and_utc(), "s").unwrap(),
            "2020-12-31 23:59:58"
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2021-01-01T06:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-01-01T06:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-01-01T06:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-01-01 06:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-01-01T06:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-01-01").unwrap().hour(), 0);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_day_begin_is_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        let ts = convert_to_day_begin(date).unwrap();
        let local = Local.timestamp_opt(ts, 0).unwrap();

        assert_eq!(local.date_naive(), date);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.minute(), 0);
    }

    #[test]
    fn test_day_begin_idempotent() {
        let date = NaiveDate::from_ymd_opt(2019, 11, 3).unwrap();
        let first = convert_to_day_begin(date).unwrap();
        let again_date = Local.timestamp_opt(first, 0).unwrap().date_naive();
        assert_eq!(convert_to_day_begin(again_date).unwrap(), first);
    }

    /// America/Santiago around 2022-09-11: clocks jump from 00:00 to 01:00
    #[derive(Debug, Clone)]
    struct SantiagoSpring;

    impl SantiagoSpring {
        fn switch_utc() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2022, 9, 11)
                .unwrap()
                .and_hms_opt(4, 0, 0)
                .unwrap()
        }

        fn winter() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for SantiagoSpring {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SantiagoSpring
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::switch_utc() - Duration::hours(4);
            let gap_end = gap_start + Duration::hours(1);
            if *local < gap_start {
                LocalResult::Single(Self::winter())
            } else if *local < gap_end {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch_utc() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn test_day_begin_skips_dst_gap() {
        let gap_day = NaiveDate::from_ymd_opt(2022, 9, 11).unwrap();
        // 01:00 -03:00, the first instant after the skipped hour
        assert_eq!(day_begin_in(&SantiagoSpring, gap_day).unwrap(), 1_662_868_800);

        let day_before = NaiveDate::from_ymd_opt(2022, 9, 10).unwrap();
        assert_eq!(day_begin_in(&SantiagoSpring, day_before).unwrap(), 1_662_782_400);
    }

    #[test]
    fn test_lookback_range() {
        let today = NaiveDate::from_ymd_opt(2022, 3, 10).unwrap();
        let range = DateRange::lookback_from(today, 29).unwrap();

        assert!(range.is_ordered());
        let start = Local.timestamp_opt(range.start, 0).unwrap();
        let end = Local.timestamp_opt(range.end, 0).unwrap();
        assert_eq!(end.date_naive(), today);
        assert_eq!(start.date_naive(), today - Duration::days(29));
        assert_eq!((start.hour(), end.hour()), (0, 0));
    }

    #[test]
    fn test_zero_lookback() {
        let today = NaiveDate::from_ymd_opt(2022, 3, 10).unwrap();
        let range = DateRange::lookback_from(today, 0).unwrap();
        assert_eq!(range.start, range.end);
    }
}
