//! Hermite interpolation between two recorded state vectors.
//!
//! Cubic when only position and velocity are known, quintic when both
//! nodes also carry an acceleration. Either way the interpolant passes
//! through both nodes with their recorded velocity, so the trajectory is
//! continuous in position and velocity across consecutive intervals.

use crate::ephemeris::{StateVector, Vector3};
use crate::time::Epoch;

pub fn interpolate(before: &StateVector, after: &StateVector, epoch: Epoch) -> StateVector {
    let h = after.epoch - before.epoch;
    let s = (epoch - before.epoch) / h;

    let (position, velocity) = match (before.acceleration, after.acceleration) {
        (Some(a0), Some(a1)) => quintic(before, after, a0, a1, h, s),
        _ => cubic(before, after, h, s),
    };

    StateVector::new(epoch, position, velocity)
}

fn cubic(p: &StateVector, q: &StateVector, h: f64, s: f64) -> (Vector3, Vector3) {
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    let d00 = 6.0 * s2 - 6.0 * s;
    let d10 = 3.0 * s2 - 4.0 * s + 1.0;
    let d01 = -6.0 * s2 + 6.0 * s;
    let d11 = 3.0 * s2 - 2.0 * s;

    let position = p.position * h00
        + p.velocity * (h10 * h)
        + q.position * h01
        + q.velocity * (h11 * h);
    let velocity = (p.position * d00 + q.position * d01) / h + p.velocity * d10 + q.velocity * d11;
    (position, velocity)
}

fn quintic(
    p: &StateVector,
    q: &StateVector,
    a0: Vector3,
    a1: Vector3,
    h: f64,
    s: f64,
) -> (Vector3, Vector3) {
    let s2 = s * s;
    let s3 = s2 * s;
    let s4 = s3 * s;
    let s5 = s4 * s;

    let h0 = 1.0 - 10.0 * s3 + 15.0 * s4 - 6.0 * s5;
    let h1 = s - 6.0 * s3 + 8.0 * s4 - 3.0 * s5;
    let h2 = 0.5 * s2 - 1.5 * s3 + 1.5 * s4 - 0.5 * s5;
    let h3 = 0.5 * s3 - s4 + 0.5 * s5;
    let h4 = -4.0 * s3 + 7.0 * s4 - 3.0 * s5;
    let h5 = 10.0 * s3 - 15.0 * s4 + 6.0 * s5;

    let d0 = -30.0 * s2 + 60.0 * s3 - 30.0 * s4;
    let d1 = 1.0 - 18.0 * s2 + 32.0 * s3 - 15.0 * s4;
    let d2 = s - 4.5 * s2 + 6.0 * s3 - 2.5 * s4;
    let d3 = 1.5 * s2 - 4.0 * s3 + 2.5 * s4;
    let d4 = -12.0 * s2 + 28.0 * s3 - 15.0 * s4;
    let d5 = 30.0 * s2 - 60.0 * s3 + 30.0 * s4;

    let hh = h * h;
    let position = p.position * h0
        + p.velocity * (h1 * h)
        + a0 * (h2 * hh)
        + a1 * (h3 * hh)
        + q.velocity * (h4 * h)
        + q.position * h5;
    let velocity = (p.position * d0 + q.position * d5) / h
        + p.velocity * d1
        + q.velocity * d4
        + (a0 * d2 + a1 * d3) * h;
    (position, velocity)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OMEGA: f64 = 2.0 * std::f64::consts::PI / 5550.0;
    const RADIUS: f64 = 6.8e6;

    /// Uniform circular motion in the x-y plane.
    fn circular(t: f64, with_acceleration: bool) -> StateVector {
        let (sin, cos) = (OMEGA * t).sin_cos();
        let mut state = StateVector::new(
            Epoch::from_seconds_j2000(t),
            Vector3::new(RADIUS * cos, RADIUS * sin, 0.0),
            Vector3::new(-RADIUS * OMEGA * sin, RADIUS * OMEGA * cos, 0.0),
        );
        if with_acceleration {
            state.acceleration = Some(-state.position * OMEGA * OMEGA);
        }
        state
    }

    #[test]
    fn reproduces_nodes_exactly() {
        let a = circular(0.0, false);
        let b = circular(240.0, false);
        let at_a = interpolate(&a, &b, a.epoch);
        let at_b = interpolate(&a, &b, b.epoch);
        assert!((at_a.position - a.position).norm() < 1e-6);
        assert!((at_b.position - b.position).norm() < 1e-6);
        assert!((at_b.velocity - b.velocity).norm() < 1e-9);
    }

    #[test]
    fn cubic_midpoint_error_is_small() {
        let a = circular(0.0, false);
        let b = circular(240.0, false);
        let truth = circular(120.0, false);
        let mid = interpolate(&a, &b, truth.epoch);
        assert!((mid.position - truth.position).norm() < 200.0);
        assert!((mid.velocity - truth.velocity).norm() < 1.0);
    }

    #[test]
    fn quintic_beats_cubic() {
        let truth = circular(100.0, true);
        let cubic = interpolate(&circular(0.0, false), &circular(240.0, false), truth.epoch);
        let quintic = interpolate(&circular(0.0, true), &circular(240.0, true), truth.epoch);
        let cubic_err = (cubic.position - truth.position).norm();
        let quintic_err = (quintic.position - truth.position).norm();
        assert!(quintic_err < cubic_err);
        assert!(quintic_err < 1.0);
    }
}
