use serde_json::Value;

use crate::ephemeris::error::EphemerisError;
use crate::ephemeris::types::{Ephemeris, Format, Frame, Metadata, StateVector, Vector3};
use crate::time::Epoch;

/// Parses a JSON state-vector feed in metres and m/s.
///
/// Either a bare array of records or an object carrying `object_name`,
/// `frame` and a `states` array. Each record holds `epoch`, `position`,
/// `velocity` and optionally `acceleration`; numbers may be quoted.
pub fn parse_json(content: &str) -> Result<Ephemeris, EphemerisError> {
    let root: Value = serde_json::from_str(content)
        .map_err(|e| EphemerisError::Malformed(format!("invalid JSON: {}", e)))?;

    let (object_name, frame, records) = match &root {
        Value::Array(records) => (None, Frame::default(), records),
        Value::Object(map) => {
            let object_name = map
                .get("object_name")
                .and_then(Value::as_str)
                .map(String::from);
            let frame = match map.get("frame").and_then(Value::as_str) {
                Some(name) => Frame::from_ccsds(name).ok_or_else(|| {
                    EphemerisError::Malformed(format!("unsupported frame {}", name))
                })?,
                None => Frame::default(),
            };
            let records = map
                .get("states")
                .and_then(Value::as_array)
                .ok_or_else(|| EphemerisError::Malformed("missing 'states' array".into()))?;
            (object_name, frame, records)
        }
        _ => {
            return Err(EphemerisError::Malformed(
                "expected an array or an object".into(),
            ))
        }
    };

    let mut states = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(state) => states.push(state),
            Err(reason) => {
                dropped += 1;
                log::warn!("Dropping JSON record {}: {}", index, reason);
            }
        }
    }

    let metadata = Metadata {
        object_name,
        frame,
        format: Format::Json,
        dropped_records: dropped,
    };
    Ephemeris::from_states(metadata, states)
}

fn parse_record(record: &Value) -> Result<StateVector, String> {
    let epoch = record
        .get("epoch")
        .and_then(Value::as_str)
        .ok_or("missing epoch")?;
    let epoch = Epoch::parse_utc(epoch).map_err(|e| e.to_string())?;
    let position = vector(record.get("position")).ok_or("missing or non-numeric position")?;
    let velocity = vector(record.get("velocity")).ok_or("missing or non-numeric velocity")?;
    let acceleration = record.get("acceleration").map(vector_or_zero);

    Ok(StateVector {
        epoch,
        position,
        velocity,
        acceleration,
    })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn vector(value: Option<&Value>) -> Option<Vector3> {
    match value?.as_array()?.as_slice() {
        [x, y, z] => Some(Vector3::new(number(x)?, number(y)?, number(z)?)),
        _ => None,
    }
}

fn vector_or_zero(value: &Value) -> Vector3 {
    let component = |i: usize| {
        value
            .as_array()
            .and_then(|items| items.get(i))
            .and_then(number)
            .unwrap_or(0.0)
    };
    Vector3::new(component(0), component(1), component(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::Model;

    #[test]
    fn parses_bare_array() {
        let content = r#"[
            {"epoch": "2024-01-05T12:00:00Z", "position": [6778137.0, 0, 0], "velocity": [0, 4700, 5900]},
            {"epoch": "2024-01-05T12:01:00Z", "position": ["6770000.5", 280000, 350000], "velocity": [-500, 4690, 5880]}
        ]"#;
        let eph = parse_json(content).unwrap();
        assert_eq!(eph.frame(), Frame::Eme2000);
        let Model::StateVectors(states) = eph.model() else {
            panic!("expected state vectors");
        };
        assert_eq!(states.len(), 2);
        assert_eq!(states[1].position.x, 6_770_000.5);
    }

    #[test]
    fn object_form_carries_metadata_and_drops_bad_records() {
        let content = r#"{
            "object_name": "ISS",
            "frame": "TEME",
            "states": [
                {"epoch": "2024-01-05T12:00:00Z", "position": [6778137.0, 0, 0], "velocity": [0, 4700, 5900],
                 "acceleration": [-8.6, "n/a", 0]},
                {"epoch": "not a time", "position": [1, 2, 3], "velocity": [1, 2, 3]},
                {"epoch": "2024-01-05T12:02:00Z", "position": [1, 2], "velocity": [1, 2, 3]},
                {"epoch": "2024-01-05T12:03:00Z", "position": [6500000, 1, 2], "velocity": [1, 2, 3]}
            ]
        }"#;
        let eph = parse_json(content).unwrap();
        let meta = eph.metadata();
        assert_eq!(meta.object_name.as_deref(), Some("ISS"));
        assert_eq!(meta.frame, Frame::Teme);
        assert_eq!(meta.dropped_records, 2);

        let Model::StateVectors(states) = eph.model() else {
            panic!("expected state vectors");
        };
        assert_eq!(states[0].acceleration, Some(Vector3::new(-8.6, 0.0, 0.0)));
        assert_eq!(states[1].acceleration, None);
    }

    #[test]
    fn all_records_bad_is_empty() {
        let content = r#"[{"epoch": "2024-01-05T12:00:00Z"}]"#;
        assert!(matches!(parse_json(content), Err(EphemerisError::Empty)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_json("[{"),
            Err(EphemerisError::Malformed(_))
        ));
    }
}
