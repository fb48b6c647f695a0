//! Process Monitoring
//!
//! Per-syscall sets of monitored pids and the monitoring mode derived
//! from them.

pub mod pidset;
pub mod watchlist;

pub use pidset::{PidSet, PidSetError};
pub use watchlist::{MonitorBoard, MonitorMode, Watchlist};
