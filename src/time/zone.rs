use std::fmt;
use std::str::FromStr;

use chrono::{
    Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::epoch::Epoch;
use super::error::TimeError;

/// Zone the sighting service historically reported in.
pub const DEFAULT_ZONE: &str = "America/New_York";

/// An IANA time zone used only at the input/output edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Zone(Tz);

impl Zone {
    pub fn utc() -> Self {
        Zone(Tz::UTC)
    }

    pub fn id(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Zone {
    fn default() -> Self {
        DEFAULT_ZONE.parse().unwrap_or_else(|_| Zone::utc())
    }
}

impl FromStr for Zone {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Tz>()
            .map(Zone)
            .map_err(|_| TimeError::UnknownZone(s.to_string()))
    }
}

impl TryFrom<String> for Zone {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Wall-clock fields, interpreted in whatever zone the caller names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

/// A localized timestamp. Output only; never converted back into an [`Epoch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CivilTimestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
    pub zone: &'static str,
    pub zone_abbrev: String,
    pub utc_offset_seconds: i32,
}

impl fmt::Display for CivilTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:06.3} {}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.zone_abbrev
        )
    }
}

/// Converts wall-clock fields in `zone` to an epoch.
///
/// A time inside a DST fold resolves to the earlier instant; a time inside
/// a DST gap is rejected.
pub fn to_epoch(fields: CalendarFields, zone: Zone) -> Result<Epoch, TimeError> {
    let invalid = || TimeError::InvalidCalendar(format!("{:?}", fields));

    if !fields.second.is_finite() || !(0.0..60.0).contains(&fields.second) {
        return Err(invalid());
    }
    let whole_seconds = fields.second.floor();
    let fraction = fields.second - whole_seconds;

    let date = NaiveDate::from_ymd_opt(fields.year, fields.month, fields.day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(fields.hour, fields.minute, whole_seconds as u32)
        .ok_or_else(invalid)?;
    let naive = NaiveDateTime::new(date, time);

    let local = match zone.0.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(TimeError::NonexistentLocalTime(naive.to_string(), zone.id()))
        }
    };

    Ok(Epoch::from_datetime(local.with_timezone(&Utc)) + fraction)
}

/// Renders an epoch as wall-clock time in `zone`.
pub fn localize(epoch: Epoch, zone: Zone) -> CivilTimestamp {
    let local = epoch.to_datetime().with_timezone(&zone.0);
    CivilTimestamp {
        year: local.year(),
        month: local.month(),
        day: local.day(),
        hour: local.hour(),
        minute: local.minute(),
        second: local.second() as f64 + local.nanosecond() as f64 * 1e-9,
        zone: zone.id(),
        zone_abbrev: local.format("%Z").to_string(),
        utc_offset_seconds: local.offset().fix().local_minus_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> CalendarFields {
        CalendarFields {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn default_zone_is_new_york() {
        assert_eq!(Zone::default().id(), "America/New_York");
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert!(matches!(
            "Mars/Olympus_Mons".parse::<Zone>(),
            Err(TimeError::UnknownZone(_))
        ));
    }

    #[test]
    fn utc_fields_map_to_epoch() {
        let epoch = to_epoch(fields(2000, 1, 1, 12, 0, 0.5), Zone::utc()).unwrap();
        assert!((epoch.seconds_j2000() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn local_fields_apply_the_zone_offset() {
        let zone: Zone = "America/New_York".parse().unwrap();
        let local = to_epoch(fields(2024, 1, 5, 7, 0, 0.0), zone).unwrap();
        let utc = to_epoch(fields(2024, 1, 5, 12, 0, 0.0), Zone::utc()).unwrap();
        assert!((local - utc).abs() < 1e-9);
    }

    #[test]
    fn dst_gap_is_an_error() {
        let zone: Zone = "America/New_York".parse().unwrap();
        let result = to_epoch(fields(2024, 3, 10, 2, 30, 0.0), zone);
        assert!(matches!(result, Err(TimeError::NonexistentLocalTime(..))));
    }

    #[test]
    fn dst_fold_takes_the_earlier_instant() {
        let zone: Zone = "America/New_York".parse().unwrap();
        let folded = to_epoch(fields(2024, 11, 3, 1, 30, 0.0), zone).unwrap();
        let edt = to_epoch(fields(2024, 11, 3, 5, 30, 0.0), Zone::utc()).unwrap();
        assert!((folded - edt).abs() < 1e-9);
    }

    #[test]
    fn invalid_calendar_fields_are_rejected() {
        assert!(to_epoch(fields(2024, 2, 30, 0, 0, 0.0), Zone::utc()).is_err());
        assert!(to_epoch(fields(2024, 2, 1, 0, 0, 61.0), Zone::utc()).is_err());
    }

    #[test]
    fn localize_reports_abbreviation_and_offset() {
        let epoch = Epoch::parse_utc("2024-07-04T16:30:15.500Z").unwrap();
        let civil = localize(epoch, "America/New_York".parse().unwrap());
        assert_eq!((civil.year, civil.month, civil.day), (2024, 7, 4));
        assert_eq!((civil.hour, civil.minute), (12, 30));
        assert!((civil.second - 15.5).abs() < 1e-6);
        assert_eq!(civil.zone_abbrev, "EDT");
        assert_eq!(civil.utc_offset_seconds, -4 * 3600);
    }

    #[test]
    fn localize_then_reparse_is_the_same_instant() {
        let zone: Zone = "Asia/Kolkata".parse().unwrap();
        let epoch = Epoch::parse_utc("2024-02-29T23:59:58Z").unwrap();
        let civil = localize(epoch, zone);
        let back = to_epoch(
            fields(
                civil.year,
                civil.month,
                civil.day,
                civil.hour,
                civil.minute,
                civil.second,
            ),
            zone,
        )
        .unwrap();
        assert!((back - epoch).abs() < 1e-3);
    }
}
