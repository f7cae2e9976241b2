use nalgebra::Matrix3;

use crate::ephemeris::{Frame, StateVector, Vector3};
use crate::frames::precession::precession_matrix;
use crate::time::Epoch;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;
const SECONDS_PER_JULIAN_YEAR: f64 = 365.25 * 86_400.0;

/// Greenwich mean sidereal angle (IAU 1982), radians.
pub fn gmst(epoch: Epoch) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(epoch.seconds_j2000() / SECONDS_PER_JULIAN_YEAR)
        .rem_euclid(std::f64::consts::TAU)
}

/// Position (m) and velocity (m/s) in the Earth-fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthFixed {
    pub epoch: Epoch,
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Rotation taking inertial vectors in `frame` to Earth-fixed axes at `epoch`.
fn inertial_to_fixed_matrix(epoch: Epoch, frame: Frame) -> Matrix3<f64> {
    let (sin, cos) = gmst(epoch).sin_cos();
    #[rustfmt::skip]
    let spin = Matrix3::new(
        cos, sin, 0.0,
        -sin, cos, 0.0,
        0.0, 0.0, 1.0,
    );
    match frame {
        Frame::Teme => spin,
        Frame::Eme2000 => spin * precession_matrix(epoch),
    }
}

pub fn inertial_to_earth_fixed(state: &StateVector, frame: Frame) -> EarthFixed {
    let rotation = inertial_to_fixed_matrix(state.epoch, frame);
    let position = rotation * state.position;
    let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RAD_S);
    let velocity = rotation * state.velocity - omega.cross(&position);
    EarthFixed {
        epoch: state.epoch,
        position,
        velocity,
    }
}

/// Inverse of [`inertial_to_earth_fixed`] for a position.
#[cfg(test)]
pub fn earth_fixed_to_inertial(position: Vector3, epoch: Epoch, frame: Frame) -> Vector3 {
    inertial_to_fixed_matrix(epoch, frame).transpose() * position
}
