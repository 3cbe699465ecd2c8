//! UTC ↔ ephemeris time (TDB seconds past J2000).
//!
//! TDB is approximated as TT (`TAI + 32.184 s`); the periodic TDB-TT term is
//! below 2 ms and ignored.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

const TT_MINUS_TAI: f64 = 32.184;

/// `(effective UTC date, TAI - UTC)` from 1999 on.
const LEAP_SECONDS: [((i32, u32, u32), f64); 6] = [
    ((1999, 1, 1), 32.0),
    ((2006, 1, 1), 33.0),
    ((2009, 1, 1), 34.0),
    ((2012, 7, 1), 35.0),
    ((2015, 7, 1), 36.0),
    ((2017, 1, 1), 37.0),
];

const FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%jT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%j %H:%M:%S%.f",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised UTC time string: {0:?}")]
pub struct TimeParseError(pub String);

/// J2000 (2000-01-01 12:00:00 TT) on the UTC scale: 11:58:55.816.
fn j2000_utc() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(946_727_935_816)
}

fn tai_minus_utc(at: &DateTime<Utc>) -> f64 {
    let date = at.date_naive();
    LEAP_SECONDS
        .iter()
        .rev()
        .find(|((y, m, d), _)| {
            NaiveDate::from_ymd_opt(*y, *m, *d).is_some_and(|start| date >= start)
        })
        .map_or(32.0, |(_, dat)| *dat)
}

/// Parse a label timestamp (`2017-05-19T06:53:05.389`, optional `Z`, or
/// day-of-year `2017-139T06:53:05.389`).
pub fn parse_utc(utc: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = utc.trim().trim_matches('"').trim_end_matches('Z');
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| TimeParseError(utc.to_string()))
}

/// Seconds past J2000 TDB for a UTC instant.
pub fn datetime_to_et(at: &DateTime<Utc>) -> f64 {
    let elapsed = (*at - j2000_utc()).num_microseconds().unwrap_or(i64::MAX) as f64 * 1e-6;
    // the reference already absorbs the 32 s offset in effect at J2000
    elapsed + tai_minus_utc(at) - 32.0
}

pub fn utc_to_et(utc: &str) -> Result<f64, TimeParseError> {
    Ok(datetime_to_et(&parse_utc(utc)?))
}

/// Inverse of [`utc_to_et`], formatted as ISO calendar with milliseconds.
pub fn et_to_utc(et: f64) -> String {
    let approx = j2000_utc() + Duration::microseconds((et * 1e6).round() as i64);
    let offset = tai_minus_utc(&approx) - 32.0;
    let at = approx - Duration::microseconds((offset * 1e6).round() as i64);
    at.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// `TDB - UTC` at `at`, seconds.
pub fn delta_et(at: &DateTime<Utc>) -> f64 {
    tai_minus_utc(at) + TT_MINUS_TAI
}
