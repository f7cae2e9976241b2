use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ephemeris::error::EphemerisError;
use crate::ephemeris::tle::ElementSet;
use crate::time::Epoch;

pub type Vector3 = nalgebra::Vector3<f64>;

/// Position (m) and velocity (m/s) in an Earth-centred inertial frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub epoch: Epoch,
    pub position: Vector3,
    pub velocity: Vector3,
    /// Recorded acceleration (m/s^2), when the source carries one.
    pub acceleration: Option<Vector3>,
}

impl StateVector {
    pub fn new(epoch: Epoch, position: Vector3, velocity: Vector3) -> Self {
        Self {
            epoch,
            position,
            velocity,
            acceleration: None,
        }
    }
}

/// Inertial frame the state vectors are expressed in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Frame {
    /// Mean equator and equinox of J2000.0.
    #[default]
    Eme2000,
    /// True equator, mean equinox (SGP4 output).
    Teme,
}

impl Frame {
    /// Maps a CCSDS `REF_FRAME` value.
    pub fn from_ccsds(name: &str) -> Option<Frame> {
        match name.trim().to_ascii_uppercase().as_str() {
            "EME2000" | "J2000" | "ICRF" | "GCRF" => Some(Frame::Eme2000),
            "TEME" => Some(Frame::Teme),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// CCSDS Orbit Ephemeris Message, keyword-value text.
    Oem,
    /// JSON array of state vector records.
    Json,
    /// Two/three line element set, propagated with SGP4.
    Tle,
}

impl Format {
    /// Guesses the format from the content itself.
    pub fn detect(content: &str) -> Option<Format> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return Some(Format::Json);
        }
        if content.contains("CCSDS_OEM_VERS") || content.contains("META_START") {
            return Some(Format::Oem);
        }
        let mut lines = content.lines().map(str::trim_start);
        let has_line1 = lines.clone().any(|l| l.starts_with("1 "));
        let has_line2 = lines.any(|l| l.starts_with("2 "));
        if has_line1 && has_line2 {
            return Some(Format::Tle);
        }
        None
    }
}

impl FromStr for Format {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oem" => Ok(Format::Oem),
            "json" => Ok(Format::Json),
            "tle" => Ok(Format::Tle),
            other => Err(EphemerisError::UnknownFormat(other.to_string())),
        }
    }
}

/// Where an ephemeris came from and what was lost while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub object_name: Option<String>,
    pub frame: Frame,
    pub format: Format,
    pub dropped_records: usize,
}

pub enum Model {
    StateVectors(Vec<StateVector>),
    Elements(ElementSet),
}

/// A loaded, validated ephemeris. Immutable after construction.
pub struct Ephemeris {
    metadata: Metadata,
    model: Model,
}

impl Ephemeris {
    /// Builds a state-vector ephemeris. Epochs must be strictly increasing.
    pub fn from_states(
        metadata: Metadata,
        states: Vec<StateVector>,
    ) -> Result<Self, EphemerisError> {
        if states.is_empty() {
            return Err(EphemerisError::Empty);
        }

        if let Some(pair) = states.windows(2).find(|w| w[1].epoch <= w[0].epoch) {
            let reason = if pair[1].epoch == pair[0].epoch {
                "duplicate epoch"
            } else {
                "epoch out of order"
            };
            return Err(EphemerisError::Malformed(format!(
                "{} at {}",
                reason, pair[1].epoch
            )));
        }

        Ok(Self {
            metadata,
            model: Model::StateVectors(states),
        })
    }

    pub fn from_elements(set: ElementSet) -> Self {
        Self {
            metadata: Metadata {
                object_name: set.name().map(String::from),
                frame: Frame::Teme,
                format: Format::Tle,
                dropped_records: 0,
            },
            model: Model::Elements(set),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn frame(&self) -> Frame {
        self.metadata.frame
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// First and last epoch with recorded data.
    pub fn span(&self) -> (Epoch, Epoch) {
        match &self.model {
            Model::StateVectors(states) => {
                let first = states.first().map(|s| s.epoch).unwrap_or_default();
                let last = states.last().map(|s| s.epoch).unwrap_or_default();
                (first, last)
            }
            Model::Elements(set) => (set.epoch(), set.epoch()),
        }
    }

    pub fn summary(&self) -> EphemerisSummary {
        let (start, end) = self.span();
        let records = match &self.model {
            Model::StateVectors(states) => states.len(),
            Model::Elements(_) => 1,
        };
        EphemerisSummary {
            object_name: self.metadata.object_name.clone(),
            frame: self.metadata.frame,
            format: self.metadata.format,
            records,
            dropped_records: self.metadata.dropped_records,
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EphemerisSummary {
    pub object_name: Option<String>,
    pub frame: Frame,
    pub format: Format,
    pub records: usize,
    pub dropped_records: usize,
    pub start: Epoch,
    pub end: Epoch,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata {
            object_name: None,
            frame: Frame::Eme2000,
            format: Format::Json,
            dropped_records: 0,
        }
    }

    fn state(seconds: f64) -> StateVector {
        StateVector::new(
            Epoch::from_seconds_j2000(seconds),
            Vector3::new(7.0e6, 0.0, 0.0),
            Vector3::new(0.0, 7.5e3, 0.0),
        )
    }

    #[test]
    fn empty_ephemeris_is_rejected() {
        assert!(matches!(
            Ephemeris::from_states(metadata(), Vec::new()),
            Err(EphemerisError::Empty)
        ));
    }

    #[test]
    fn duplicate_epochs_are_rejected() {
        let result = Ephemeris::from_states(metadata(), vec![state(0.0), state(60.0), state(60.0)]);
        match result {
            Err(EphemerisError::Malformed(msg)) => assert!(msg.contains("duplicate")),
            _ => panic!("expected malformed ephemeris"),
        }
    }

    #[test]
    fn unsorted_epochs_are_rejected() {
        let result = Ephemeris::from_states(metadata(), vec![state(60.0), state(0.0)]);
        match result {
            Err(EphemerisError::Malformed(msg)) => assert!(msg.contains("out of order")),
            _ => panic!("expected malformed ephemeris"),
        }
    }

    #[test]
    fn summary_reports_span() {
        let eph = Ephemeris::from_states(metadata(), vec![state(0.0), state(60.0)]).unwrap();
        let summary = eph.summary();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.start, Epoch::J2000);
        assert_eq!(summary.end, Epoch::from_seconds_j2000(60.0));
    }

    #[test]
    fn detects_formats_from_content() {
        assert_eq!(Format::detect("  [ {\"epoch\": 1} ]"), Some(Format::Json));
        assert_eq!(Format::detect("CCSDS_OEM_VERS = 2.0\n"), Some(Format::Oem));
        assert_eq!(
            Format::detect("ISS\n1 25544U ...\n2 25544 ...\n"),
            Some(Format::Tle)
        );
        assert_eq!(Format::detect("hello"), None);
    }

    #[test]
    fn frame_names_follow_ccsds() {
        assert_eq!(Frame::from_ccsds("EME2000"), Some(Frame::Eme2000));
        assert_eq!(Frame::from_ccsds("teme"), Some(Frame::Teme));
        assert_eq!(Frame::from_ccsds("ITRF"), None);
        assert_eq!(Frame::Eme2000.to_string(), "EME2000");
    }
}
