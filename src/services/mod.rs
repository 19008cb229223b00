//! External side effects of the timer
//!
//! Currently only alarm playback, which shells out to an audio player.

pub mod alarm;

pub use alarm::{AlarmPlayer, CommandAlarm, SilentAlarm};
