use thiserror::Error;

#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("ephemeris contains no state vectors")]
    Empty,
    #[error("malformed ephemeris: {0}")]
    Malformed(String),
    #[error("ephemeris read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown ephemeris format: {0}")]
    UnknownFormat(String),
    #[error("propagation error: {0}")]
    Propagation(String),
}
