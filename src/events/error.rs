use thiserror::Error;

use crate::ephemeris::EphemerisError;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("no pass found in the search window")]
    NoPassFound,
    #[error("invalid search window: {0}")]
    InvalidWindow(String),
    #[error("invalid elevation threshold: {0} deg")]
    InvalidThreshold(f64),
    #[error("invalid grid step: {0}")]
    InvalidGridStep(String),
    #[error(transparent)]
    Propagation(#[from] EphemerisError),
}
