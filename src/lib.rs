//! Pomodoro Timer - A state-managed HTTP server running one shared Pomodoro timer
//!
//! This library provides the timer store with its mode transition policy,
//! durable settings and run-state storage, the one-second tick driver and
//! the HTTP API every client uses to read and control the timer.

pub mod config;
pub mod state;
pub mod storage;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerStore};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
