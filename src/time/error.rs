use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("invalid calendar date/time: {0}")]
    InvalidCalendar(String),
    #[error("unknown time zone: {0}")]
    UnknownZone(String),
    #[error("local time {0} does not exist in zone {1}")]
    NonexistentLocalTime(String, &'static str),
    #[error("unparsable timestamp: {0}")]
    Unparsable(String),
}
