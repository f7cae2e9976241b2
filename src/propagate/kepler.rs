//! Two-body propagation with universal variables.
//!
//! Used when the query epoch lies outside the recorded span (or the
//! ephemeris holds a single vector). Exact at `dt = 0`; elsewhere it is
//! unperturbed Keplerian motion, so accuracy degrades with distance from
//! the source vector.

use crate::ephemeris::{StateVector, Vector3};
use crate::time::Epoch;

/// Earth gravitational parameter, m^3/s^2 (WGS-84).
pub const MU_EARTH: f64 = 3.986_004_418e14;

const MAX_ITERATIONS: usize = 50;
const TOLERANCE: f64 = 1e-10;

pub fn propagate(state: &StateVector, epoch: Epoch) -> StateVector {
    let dt = epoch - state.epoch;
    let r0_vec = state.position;
    let v0_vec = state.velocity;
    let r0 = r0_vec.norm();

    if dt == 0.0 || r0 == 0.0 {
        return StateVector { epoch, ..*state };
    }

    let sqrt_mu = MU_EARTH.sqrt();
    let v0 = v0_vec.norm();
    let vr0 = r0_vec.dot(&v0_vec) / r0;
    let alpha = 2.0 / r0 - v0 * v0 / MU_EARTH;

    let chi = solve_universal_anomaly(dt, r0, vr0, alpha);
    let z = alpha * chi * chi;
    let (c, s) = stumpff(z);

    let f = 1.0 - chi * chi / r0 * c;
    let g = dt - chi.powi(3) / sqrt_mu * s;
    let position: Vector3 = r0_vec * f + v0_vec * g;
    let r = position.norm();

    let f_dot = sqrt_mu / (r * r0) * (z * s - 1.0) * chi;
    let g_dot = 1.0 - chi * chi / r * c;
    let velocity = r0_vec * f_dot + v0_vec * g_dot;

    StateVector::new(epoch, position, velocity)
}

/// Newton iteration on the universal Kepler equation. Returns the last
/// iterate if the cap is reached.
fn solve_universal_anomaly(dt: f64, r0: f64, vr0: f64, alpha: f64) -> f64 {
    let sqrt_mu = MU_EARTH.sqrt();
    let mut chi = if alpha > 0.0 {
        sqrt_mu * alpha * dt
    } else {
        sqrt_mu * dt / r0
    };

    for _ in 0..MAX_ITERATIONS {
        let z = alpha * chi * chi;
        let (c, s) = stumpff(z);
        let chi2 = chi * chi;
        let f = r0 * vr0 / sqrt_mu * chi2 * c + (1.0 - alpha * r0) * chi2 * chi * s + r0 * chi
            - sqrt_mu * dt;
        let df = r0 * vr0 / sqrt_mu * chi * (1.0 - z * s) + (1.0 - alpha * r0) * chi2 * c + r0;
        let step = f / df;
        chi -= step;
        if step.abs() < TOLERANCE * chi.abs().max(1.0) {
            break;
        }
    }
    chi
}

/// Stumpff functions `(C(z), S(z))`.
fn stumpff(z: f64) -> (f64, f64) {
    if z.abs() < 1e-6 {
        (
            0.5 - z / 24.0 + z * z / 720.0,
            1.0 / 6.0 - z / 120.0 + z * z / 5040.0,
        )
    } else if z > 0.0 {
        let sz = z.sqrt();
        ((1.0 - sz.cos()) / z, (sz - sz.sin()) / sz.powi(3))
    } else {
        let sz = (-z).sqrt();
        ((sz.cosh() - 1.0) / -z, (sz.sinh() - sz) / sz.powi(3))
    }
}
