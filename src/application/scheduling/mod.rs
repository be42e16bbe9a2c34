//! Task scheduling - Interval and calendar timers plus the connect-time catch-up pass

pub mod cadence;
pub mod scheduler;

pub use cadence::{parse_interval, Cadence};
pub use scheduler::TaskScheduler;
