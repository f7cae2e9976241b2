use std::fmt;
use std::ops::{Add, Sub};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use super::error::TimeError;

/// 2000-01-01T12:00:00Z as a Unix timestamp.
const J2000_UNIX_SECONDS: i64 = 946_728_000;
const J2000_JULIAN_DATE: f64 = 2_451_545.0;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Naive layouts accepted on top of RFC 3339. Both are read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%jT%H:%M:%S%.f"];

/// An instant on the UTC time line, stored as seconds since J2000.0.
///
/// Leap seconds are not counted (POSIX convention), so the difference
/// between two epochs is plain elapsed civil seconds. An `f64` keeps
/// sub-microsecond resolution for several centuries around J2000.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Epoch(f64);

impl Epoch {
    pub const J2000: Epoch = Epoch(0.0);

    pub fn from_seconds_j2000(seconds: f64) -> Self {
        Epoch(seconds)
    }

    pub fn seconds_j2000(self) -> f64 {
        self.0
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let whole = (datetime.timestamp() - J2000_UNIX_SECONDS) as f64;
        let fraction = datetime.timestamp_subsec_nanos() as f64 / NANOS_PER_SECOND as f64;
        Epoch(whole + fraction)
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        let whole = self.0.floor();
        let mut secs = whole as i64 + J2000_UNIX_SECONDS;
        let mut nanos = ((self.0 - whole) * NANOS_PER_SECOND as f64).round() as i64;
        if nanos >= NANOS_PER_SECOND {
            secs += 1;
            nanos -= NANOS_PER_SECOND;
        }
        DateTime::from_timestamp(secs, nanos as u32).unwrap_or_default()
    }

    /// Julian date on the UTC scale.
    pub fn julian_date(self) -> f64 {
        J2000_JULIAN_DATE + (self - Epoch::J2000) / SECONDS_PER_DAY
    }

    /// Parses RFC 3339, or a zone-less ISO calendar / day-of-year timestamp
    /// (`2024-01-05T12:00:00.000`, `2024-005T12:00:00.000`) taken as UTC.
    pub fn parse_utc(text: &str) -> Result<Self, TimeError> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }

        let naive = text.strip_suffix('Z').unwrap_or(text);
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
            .map(|dt| Self::from_datetime(dt.and_utc()))
            .ok_or_else(|| TimeError::Unparsable(text.to_string()))
    }
}

impl Add<f64> for Epoch {
    type Output = Epoch;

    fn add(self, seconds: f64) -> Epoch {
        Epoch(self.0 + seconds)
    }
}

impl Sub<f64> for Epoch {
    type Output = Epoch;

    fn sub(self, seconds: f64) -> Epoch {
        Epoch(self.0 - seconds)
    }
}

/// Elapsed seconds between two epochs.
impl Sub for Epoch {
    type Output = f64;

    fn sub(self, other: Epoch) -> f64 {
        self.0 - other.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.to_datetime().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

impl Serialize for Epoch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
