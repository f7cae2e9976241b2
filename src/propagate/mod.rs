//! State at an arbitrary epoch from a loaded ephemeris.

mod analytic;
mod hermite;
mod kepler;

use crate::ephemeris::{Ephemeris, EphemerisError, Frame, Model, StateVector};
use crate::time::Epoch;

#[cfg(test)]
pub(crate) use kepler::{propagate as two_body, MU_EARTH};

pub trait Propagator {
    /// Inertial frame of the states this propagator produces.
    fn frame(&self) -> Frame;

    /// Inertial state at `epoch`. Epochs outside the covered span are
    /// answered on a best-effort basis rather than rejected.
    fn state_at(&self, epoch: Epoch) -> Result<StateVector, EphemerisError>;
}

impl Propagator for Ephemeris {
    fn frame(&self) -> Frame {
        self.metadata().frame
    }

    fn state_at(&self, epoch: Epoch) -> Result<StateVector, EphemerisError> {
        match self.model() {
            Model::StateVectors(states) => state_at(states, epoch),
            Model::Elements(set) => analytic::propagate(set, epoch),
        }
    }
}

/// Interpolates inside the recorded span and falls back to two-body motion
/// from the nearest end outside it. `states` must be sorted by epoch.
pub fn state_at(states: &[StateVector], epoch: Epoch) -> Result<StateVector, EphemerisError> {
    let (Some(first), Some(last)) = (states.first(), states.last()) else {
        return Err(EphemerisError::Empty);
    };

    if epoch <= first.epoch {
        return Ok(kepler::propagate(first, epoch));
    }
    if epoch >= last.epoch {
        return Ok(kepler::propagate(last, epoch));
    }

    let idx = states.partition_point(|s| s.epoch <= epoch);
    let before = &states[idx - 1];
    if before.epoch == epoch {
        return Ok(*before);
    }
    Ok(hermite::interpolate(before, &states[idx], epoch))
}
