//! Background tasks module
//!
//! This module contains the tick driver that runs alongside the HTTP server.

pub mod tick_driver;

// Re-export main types
pub use tick_driver::{TickDriver, TICK_PERIOD};
