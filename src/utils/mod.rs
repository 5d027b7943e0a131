//! Utility Module
//!
//! - [`time`]: Monotonic elapsed-time source polled once per simulation step

pub mod time;

pub use time::ElapsedClock;
