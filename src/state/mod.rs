//! State management module
//!
//! This module contains the timer models, the transition policy and the
//! store that owns the one shared timer.

pub mod settings;
pub mod run_state;
pub mod transition;
pub mod timer_store;
pub mod app_state;

// Re-export main types
pub use settings::{AlarmSound, TimerSettings};
pub use run_state::{TimerMode, TimerRunState, TimerSnapshot};
pub use transition::{complete_interval, next_mode, reconcile, Reconciled};
pub use timer_store::{TickOutcome, TimerStore};
pub use app_state::AppState;
