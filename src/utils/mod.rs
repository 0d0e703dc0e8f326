mod datetime;
mod string;

pub use datetime::{Clock, SystemClock};
pub use string::short_cause;
