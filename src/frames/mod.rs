//! Inertial, Earth-fixed, geodetic and topocentric conversions.

mod earth_rotation;
mod geodetic;
mod precession;
mod topocentric;

#[cfg(test)]
pub use geodetic::WGS84_A_M;
pub use geodetic::{inertial_to_sub_point, Observer, SubPoint};
pub use topocentric::{inertial_to_topocentric, TopocentricView};
