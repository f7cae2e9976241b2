//! Rise, culmination and set search over a time window.

mod error;
mod finder;
mod roots;
mod types;

pub use error::EventError;
pub use finder::{EventFinder, SearchConfig};
pub use types::{LocalizedPass, Pass};
