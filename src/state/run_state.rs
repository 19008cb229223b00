//! Run state of the countdown and the read-only snapshot handed to clients

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimerSettings;
use crate::utils::format_time;

/// Kind of interval currently counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(&self) -> bool {
        matches!(self, TimerMode::ShortBreak | TimerMode::LongBreak)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short-break",
            TimerMode::LongBreak => "long-break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "short-break" => Ok(TimerMode::ShortBreak),
            "long-break" => Ok(TimerMode::LongBreak),
            other => Err(format!("Unknown timer mode: {}", other)),
        }
    }
}

/// Countdown state, persisted as the run-state entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRunState")]
pub struct TimerRunState {
    #[serde(rename = "currentMode")]
    pub mode: TimerMode,
    #[serde(rename = "timeLeft")]
    pub remaining_seconds: u64,
    #[serde(rename = "isActive")]
    pub running: bool,
    #[serde(rename = "completedSessions")]
    pub completed_focus_sessions: u64,
    /// Wall-clock time of the last decrement, stored as epoch milliseconds
    #[serde(rename = "lastTick", with = "chrono::serde::ts_milliseconds")]
    pub last_tick: DateTime<Utc>,
}

/// Run-state entry as read back, with optional counters and timestamp
#[derive(Debug, Deserialize)]
struct StoredRunState {
    #[serde(rename = "currentMode")]
    mode: TimerMode,
    #[serde(rename = "timeLeft")]
    remaining_seconds: u64,
    #[serde(rename = "isActive", default)]
    running: bool,
    #[serde(rename = "completedSessions", default)]
    completed_focus_sessions: u64,
    #[serde(rename = "lastTick", with = "chrono::serde::ts_milliseconds_option", default)]
    last_tick: Option<DateTime<Utc>>,
}

impl From<StoredRunState> for TimerRunState {
    /// Without a timestamp the elapsed time is unknown, so the timer is
    /// restored paused
    fn from(stored: StoredRunState) -> Self {
        Self {
            mode: stored.mode,
            remaining_seconds: stored.remaining_seconds,
            running: stored.running && stored.last_tick.is_some(),
            completed_focus_sessions: stored.completed_focus_sessions,
            last_tick: stored.last_tick.unwrap_or_else(Utc::now),
        }
    }
}

impl TimerRunState {
    /// A paused focus interval at full length
    pub fn fresh(settings: &TimerSettings, now: DateTime<Utc>) -> Self {
        Self {
            mode: TimerMode::Focus,
            remaining_seconds: settings.duration_for(TimerMode::Focus),
            running: false,
            completed_focus_sessions: 0,
            last_tick: now,
        }
    }
}

/// Everything a client needs to render the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub completed_focus_sessions: u64,
    /// "Session N" label, counting the interval in progress
    pub session_number: u64,
    pub duration_seconds: u64,
    pub progress_percent: f64,
    /// Remaining time as MM:SS
    pub display: String,
    pub settings: TimerSettings,
}

impl TimerSnapshot {
    pub fn new(run: &TimerRunState, settings: &TimerSettings) -> Self {
        let duration_seconds = settings.duration_for(run.mode);
        let progress_percent = if duration_seconds > 0 {
            let elapsed = duration_seconds.saturating_sub(run.remaining_seconds);
            elapsed as f64 / duration_seconds as f64 * 100.0
        } else {
            0.0
        };

        Self {
            mode: run.mode,
            remaining_seconds: run.remaining_seconds,
            running: run.running,
            completed_focus_sessions: run.completed_focus_sessions,
            session_number: run.completed_focus_sessions + 1,
            duration_seconds,
            progress_percent,
            display: format_time(run.remaining_seconds),
            settings: settings.clone(),
        }
    }
}
