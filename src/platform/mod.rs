//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic game clock)
//! - Storage (LocalStorage on web, in-memory on native)

pub mod storage;
pub mod time;

pub use storage::PlatformStore;
pub use time::MonotonicClock;
