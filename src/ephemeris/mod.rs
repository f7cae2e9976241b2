mod error;
mod json;
mod loader;
mod oem;
mod tle;
mod types;

pub use error::EphemerisError;
pub use loader::{load, LoadOptions, Source};
pub use tle::ElementSet;
#[cfg(test)]
pub use types::Metadata;
pub use types::{Ephemeris, EphemerisSummary, Format, Frame, Model, StateVector, Vector3};

/// Reads an optional numeric field, falling back to 0 for anything unparsable.
pub(crate) fn value_or_zero(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
