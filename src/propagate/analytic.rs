use crate::ephemeris::{ElementSet, EphemerisError, StateVector, Vector3};
use crate::time::Epoch;

const KM: f64 = 1000.0;

/// SGP4 state in TEME at `epoch`.
pub fn propagate(set: &ElementSet, epoch: Epoch) -> Result<StateVector, EphemerisError> {
    let minutes = set
        .elements
        .datetime_to_minutes_since_epoch(&epoch.to_datetime().naive_utc())
        .map_err(|e| EphemerisError::Propagation(e.to_string()))?;

    let prediction = set
        .constants
        .propagate(minutes)
        .map_err(|e| EphemerisError::Propagation(e.to_string()))?;

    Ok(StateVector::new(
        epoch,
        Vector3::from(prediction.position) * KM,
        Vector3::from(prediction.velocity) * KM,
    ))
}
