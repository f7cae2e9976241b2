use crate::ephemeris::error::EphemerisError;
use crate::ephemeris::types::{Ephemeris, Format, Frame, Metadata, StateVector, Vector3};
use crate::ephemeris::value_or_zero;
use crate::time::Epoch;

const KM: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Meta,
    Data,
    Covariance,
}

/// Parses a CCSDS OEM in keyword-value notation.
///
/// Data lines are `EPOCH X Y Z X_DOT Y_DOT Z_DOT [X_DDOT Y_DDOT Z_DDOT]` in
/// km, km/s and km/s^2. A line whose epoch or state components do not parse
/// is dropped and logged; a non-numeric acceleration component reads as 0.
pub fn parse_oem(content: &str) -> Result<Ephemeris, EphemerisError> {
    let mut object_name = None;
    let mut frame = None;
    let mut states = Vec::new();
    let mut dropped = 0usize;
    let mut section = Section::Header;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("COMMENT") {
            continue;
        }

        match line {
            "META_START" => {
                section = Section::Meta;
                continue;
            }
            "META_STOP" => {
                section = Section::Data;
                continue;
            }
            "COVARIANCE_START" => {
                section = Section::Covariance;
                continue;
            }
            "COVARIANCE_STOP" => {
                section = Section::Data;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Covariance => {}
            Section::Header | Section::Meta => {
                let Some((key, value)) = line.split_once('=') else {
                    return Err(EphemerisError::Malformed(format!(
                        "line {}: expected KEYWORD = VALUE, found '{}'",
                        line_no, line
                    )));
                };
                let value = value.trim();
                match key.trim() {
                    "OBJECT_NAME" => object_name = Some(value.to_string()),
                    "REF_FRAME" => {
                        let parsed = Frame::from_ccsds(value).ok_or_else(|| {
                            EphemerisError::Malformed(format!("unsupported REF_FRAME {}", value))
                        })?;
                        if frame.is_some_and(|f| f != parsed) {
                            return Err(EphemerisError::Malformed(
                                "segments use different reference frames".into(),
                            ));
                        }
                        frame = Some(parsed);
                    }
                    "CENTER_NAME" if !value.eq_ignore_ascii_case("EARTH") => {
                        return Err(EphemerisError::Malformed(format!(
                            "unsupported CENTER_NAME {}",
                            value
                        )));
                    }
                    "TIME_SYSTEM" if !value.eq_ignore_ascii_case("UTC") => {
                        return Err(EphemerisError::Malformed(format!(
                            "unsupported TIME_SYSTEM {}",
                            value
                        )));
                    }
                    _ => {}
                }
            }
            Section::Data => {
                if line.contains('=') {
                    continue;
                }
                match parse_data_line(line) {
                    Ok(state) => states.push(state),
                    Err(reason) => {
                        dropped += 1;
                        log::warn!("Dropping OEM record at line {}: {}", line_no, reason);
                    }
                }
            }
        }
    }

    let metadata = Metadata {
        object_name,
        frame: frame.unwrap_or_default(),
        format: Format::Oem,
        dropped_records: dropped,
    };
    Ephemeris::from_states(metadata, states)
}

fn parse_data_line(line: &str) -> Result<StateVector, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 7 {
        return Err(format!(
            "expected epoch and 6 state components, found {} fields",
            tokens.len()
        ));
    }

    let epoch = Epoch::parse_utc(tokens[0]).map_err(|e| e.to_string())?;

    let mut components = [0.0f64; 6];
    for (slot, token) in components.iter_mut().zip(&tokens[1..7]) {
        *slot = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("non-numeric state component '{}'", token))?;
    }

    let acceleration = (tokens.len() >= 10).then(|| {
        Vector3::new(
            value_or_zero(tokens[7]),
            value_or_zero(tokens[8]),
            value_or_zero(tokens[9]),
        ) * KM
    });

    Ok(StateVector {
        epoch,
        position: Vector3::new(components[0], components[1], components[2]) * KM,
        velocity: Vector3::new(components[3], components[4], components[5]) * KM,
        acceleration,
    })
}
