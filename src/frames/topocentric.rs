use serde::Serialize;

use crate::ephemeris::{Frame, StateVector, Vector3};
use crate::frames::earth_rotation::inertial_to_earth_fixed;
use crate::frames::geodetic::Observer;
use crate::time::Epoch;

/// Below this horizontal/slant ratio the azimuth is reported as 0.
const DEGENERATE_AZIMUTH_RATIO: f64 = 1e-12;
/// Closer than this the satellite is treated as sitting on the observer.
const COINCIDENT_RANGE_M: f64 = 1e-3;

/// Look angles from an observer to a satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopocentricView {
    /// Clockwise from geographic north, [0, 360).
    pub azimuth_deg: f64,
    /// Above the local horizon, [-90, 90].
    pub elevation_deg: f64,
    pub range_m: f64,
    /// Positive when receding.
    pub range_rate_m_s: f64,
    pub at: Epoch,
}

/// Look angles at the state's own epoch.
///
/// When the satellite is at the observer's zenith or nadir, or coincides
/// with the observer, the azimuth is undefined and reported as 0. A
/// coincident satellite also reports elevation 0.
pub fn inertial_to_topocentric(
    state: &StateVector,
    frame: Frame,
    observer: &Observer,
) -> TopocentricView {
    let sat = inertial_to_earth_fixed(state, frame);
    let dr = sat.position - observer.position_ecef();
    let range = dr.norm();

    if range < COINCIDENT_RANGE_M {
        return TopocentricView {
            azimuth_deg: 0.0,
            elevation_deg: 0.0,
            range_m: range,
            range_rate_m_s: 0.0,
            at: state.epoch,
        };
    }

    let enu = ecef_to_enu(&dr, observer.lat_rad(), observer.lon_rad());
    let horizontal = enu.x.hypot(enu.y);
    let azimuth = if horizontal <= DEGENERATE_AZIMUTH_RATIO * range {
        0.0
    } else {
        enu.x.atan2(enu.y).to_degrees().rem_euclid(360.0)
    };
    let elevation = (enu.z / range).clamp(-1.0, 1.0).asin().to_degrees();
    let range_rate = sat.velocity.dot(&dr) / range;

    TopocentricView {
        azimuth_deg: azimuth,
        elevation_deg: elevation,
        range_m: range,
        range_rate_m_s: range_rate,
        at: state.epoch,
    }
}

/// Rotates an Earth-fixed offset into local east/north/up.
pub fn ecef_to_enu(dr: &Vector3, lat_rad: f64, lon_rad: f64) -> Vector3 {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = -sin_lon * dr.x + cos_lon * dr.y;
    let north = -sin_lat * cos_lon * dr.x - sin_lat * sin_lon * dr.y + cos_lat * dr.z;
    let up = cos_lat * cos_lon * dr.x + cos_lat * sin_lon * dr.y + sin_lat * dr.z;
    Vector3::new(east, north, up)
}
