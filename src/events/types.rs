use serde::Serialize;

use crate::time::{localize, CivilTimestamp, Epoch, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Rise,
    Culmination,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassEvent {
    pub kind: EventKind,
    pub time: Epoch,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

/// One visibility window: rise, culmination and set, in time order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pass {
    pub rise: PassEvent,
    pub culmination: PassEvent,
    pub set: PassEvent,
}

impl Pass {
    pub fn duration_seconds(&self) -> f64 {
        self.set.time - self.rise.time
    }

    pub fn max_elevation_deg(&self) -> f64 {
        self.culmination.elevation_deg
    }

    pub fn localize(&self, zone: Zone) -> LocalizedPass {
        let event = |e: &PassEvent| LocalizedEvent {
            kind: e.kind,
            utc: e.time,
            local: localize(e.time, zone),
            elevation_deg: round2(e.elevation_deg),
            azimuth_deg: round2(e.azimuth_deg),
        };
        LocalizedPass {
            rise: event(&self.rise),
            culmination: event(&self.culmination),
            set: event(&self.set),
            duration_seconds: self.duration_seconds().round() as i64,
            max_elevation_deg: round2(self.max_elevation_deg()),
        }
    }
}

/// Output form of a [`Pass`] for a given zone.
#[derive(Debug, Clone, Serialize)]
pub struct LocalizedPass {
    pub rise: LocalizedEvent,
    pub culmination: LocalizedEvent,
    pub set: LocalizedEvent,
    pub duration_seconds: i64,
    pub max_elevation_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalizedEvent {
    pub kind: EventKind,
    pub utc: Epoch,
    pub local: CivilTimestamp,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, time: &str, elevation_deg: f64, azimuth_deg: f64) -> PassEvent {
        PassEvent {
            kind,
            time: Epoch::parse_utc(time).unwrap(),
            elevation_deg,
            azimuth_deg,
        }
    }

    fn sample_pass() -> Pass {
        Pass {
            rise: event(EventKind::Rise, "2024-07-04T01:10:00Z", 10.0, 231.456),
            culmination: event(EventKind::Culmination, "2024-07-04T01:13:20Z", 62.349, 312.0),
            set: event(EventKind::Set, "2024-07-04T01:16:30Z", 10.0, 41.9),
        }
    }

    #[test]
    fn duration_and_peak() {
        let pass = sample_pass();
        assert_eq!(pass.duration_seconds(), 390.0);
        assert_eq!(pass.max_elevation_deg(), 62.349);
        assert_eq!(pass.culmination.kind, EventKind::Culmination);
    }

    #[test]
    fn localized_pass_carries_zone_and_rounding() {
        let localized = sample_pass().localize("America/New_York".parse().unwrap());
        assert_eq!(localized.rise.local.day, 3);
        assert_eq!(localized.rise.local.hour, 21);
        assert_eq!(localized.rise.local.zone_abbrev, "EDT");
        assert_eq!(localized.rise.azimuth_deg, 231.46);
        assert_eq!(localized.max_elevation_deg, 62.35);
        assert_eq!(localized.duration_seconds, 390);
    }

    #[test]
    fn serializes_kinds_in_snake_case() {
        let json = serde_json::to_value(sample_pass()).unwrap();
        assert_eq!(json["culmination"]["kind"], "culmination");
        assert_eq!(json["rise"]["time"], "2024-07-04T01:10:00.000Z");
        assert_eq!(EventKind::Set.to_string(), "set");
    }
}
