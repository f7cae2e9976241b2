use serde::{Deserialize, Serialize};

use crate::ephemeris::{Frame, StateVector, Vector3};
use crate::frames::earth_rotation::inertial_to_earth_fixed;
use crate::time::Epoch;

// WGS-84
pub const WGS84_A_M: f64 = 6_378_137.0;
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

const MAX_ITERATIONS: usize = 20;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// A ground observer on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub elevation_m: f64,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            elevation_m: 0.0,
        }
    }
}

impl Observer {
    /// Returns `None` for latitudes outside [-90, 90], longitudes outside
    /// [-180, 360) or non-finite values.
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude_deg)
            && (-180.0..360.0).contains(&longitude_deg)
            && elevation_m.is_finite();
        valid.then_some(Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
        })
    }

    /// Parses `"lat,lon"` or `"lat,lon,elevation_m"`.
    pub fn from_coordinates(coordinates: &str) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if !(2..=3).contains(&parts.len()) {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        let elevation = match parts.get(2) {
            Some(text) => text.parse().ok()?,
            None => 0.0,
        };
        Self::new(lat, lon, elevation)
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef(&self) -> Vector3 {
        geodetic_to_ecef(self.lat_rad(), self.lon_rad(), self.elevation_m)
    }
}

/// Geodetic point directly beneath a satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub at: Epoch,
}

pub fn geodetic_to_ecef(lat_rad: f64, lon_rad: f64, height_m: f64) -> Vector3 {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();
    let n = WGS84_A_M / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Vector3::new(
        (n + height_m) * cos_lat * cos_lon,
        (n + height_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + height_m) * sin_lat,
    )
}

/// Earth-fixed position to `(lat_rad, lon_rad, height_m)`.
///
/// Fixed-point iteration on the geodetic latitude; well conditioned at
/// the poles and converges in a handful of steps for any orbit altitude.
pub fn ecef_to_geodetic(position: &Vector3) -> (f64, f64, f64) {
    let (x, y, z) = (position.x, position.y, position.z);
    let lon = y.atan2(x);
    let p = x.hypot(y);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_A_M / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let next = (z + WGS84_E2 * n * sin_lat).atan2(p);
        let converged = (next - lat).abs() < LATITUDE_TOLERANCE_RAD;
        lat = next;
        if converged {
            break;
        }
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let height =
        p * cos_lat + z * sin_lat - WGS84_A_M * (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    (lat, lon, height)
}

pub fn inertial_to_sub_point(state: &StateVector, frame: Frame) -> SubPoint {
    let fixed = inertial_to_earth_fixed(state, frame);
    let (lat, lon, height) = ecef_to_geodetic(&fixed.position);
    SubPoint {
        latitude_deg: lat.to_degrees(),
        longitude_deg: lon.to_degrees(),
        altitude_km: height / 1000.0,
        at: state.epoch,
    }
}
