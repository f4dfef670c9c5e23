//! Background Tasks Module
//!
//! Long-lived tasks running alongside the HTTP server.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - Persistence: Saves the cache to disk periodically and on shutdown
//!
//! `drain_then_stop` sequences their shutdown after the HTTP server drains.

mod cleanup;
mod persist;
mod shutdown;

pub use cleanup::spawn_cleanup_task;
pub use persist::{persist_once, spawn_persist_task};
pub use shutdown::drain_then_stop;
