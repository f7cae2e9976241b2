mod epoch;
mod error;
mod zone;

pub use epoch::{Epoch, SECONDS_PER_DAY};
pub use zone::{localize, to_epoch, CalendarFields, CivilTimestamp, Zone};
