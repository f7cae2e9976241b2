//! Shared fixtures for unit tests: a known TLE and exact two-body ephemerides.

use crate::ephemeris::{
    load, Ephemeris, Format, Frame, LoadOptions, Metadata, Source, StateVector, Vector3,
};
use crate::frames::WGS84_A_M;
use crate::propagate::{two_body, MU_EARTH};
use crate::time::Epoch;

pub const ISS_TLE_LINE1: &str =
    "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
pub const ISS_TLE_LINE2: &str =
    "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";
pub const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

pub fn iss_from_tle() -> Ephemeris {
    load(Source::Bytes(ISS_TLE.as_bytes()), &LoadOptions::default()).unwrap()
}

pub fn reference_epoch() -> Epoch {
    Epoch::parse_utc("2024-01-05T12:00:00Z").unwrap()
}

/// Circular orbit state at `epoch`, positioned by argument of latitude.
pub fn circular_state(
    epoch: Epoch,
    altitude_m: f64,
    inclination_deg: f64,
    raan_deg: f64,
    arg_latitude_deg: f64,
) -> StateVector {
    let radius = WGS84_A_M + altitude_m;
    let speed = (MU_EARTH / radius).sqrt();
    let (sin_i, cos_i) = inclination_deg.to_radians().sin_cos();
    let (sin_o, cos_o) = raan_deg.to_radians().sin_cos();
    let (sin_u, cos_u) = arg_latitude_deg.to_radians().sin_cos();

    let radial = Vector3::new(
        cos_o * cos_u - sin_o * sin_u * cos_i,
        sin_o * cos_u + cos_o * sin_u * cos_i,
        sin_u * sin_i,
    );
    let along = Vector3::new(
        -cos_o * sin_u - sin_o * cos_u * cos_i,
        -sin_o * sin_u + cos_o * cos_u * cos_i,
        cos_u * sin_i,
    );
    StateVector::new(epoch, radial * radius, along * speed)
}

/// Samples two-body motion from `initial` every `step_s` over `span_s`.
pub fn sampled_ephemeris(
    initial: &StateVector,
    frame: Frame,
    span_s: f64,
    step_s: f64,
) -> Ephemeris {
    let count = (span_s / step_s).floor() as usize;
    let states = (0..=count)
        .map(|k| two_body(initial, initial.epoch + k as f64 * step_s))
        .collect();
    let metadata = Metadata {
        object_name: Some("TESTSAT".to_string()),
        frame,
        format: Format::Json,
        dropped_records: 0,
    };
    Ephemeris::from_states(metadata, states).unwrap()
}
