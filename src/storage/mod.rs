//! Durable storage for settings and run state
//!
//! Two independent entries are kept, one for settings and one for the
//! countdown, so settings survive whatever happens to the run state.

pub mod file;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::state::{TimerRunState, TimerSettings};

pub use file::FileStorage;
pub use memory::MemoryStorage;

pub const SETTINGS_KEY: &str = "pomodoro-settings";
pub const RUN_STATE_KEY: &str = "pomodoro-state";

/// String key/value storage
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Outcome of reading one entry
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Found(T),
    Missing,
    Corrupt(String),
}

impl<T> Loaded<T> {
    /// Take the value, logging and discarding anything unusable
    pub fn or_else_log(self, key: &str, fallback: impl FnOnce() -> T) -> T {
        match self {
            Loaded::Found(value) => value,
            Loaded::Missing => fallback(),
            Loaded::Corrupt(reason) => {
                warn!("Discarding corrupt {} entry: {}", key, reason);
                fallback()
            }
        }
    }
}

fn load_entry<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Loaded<T> {
    match storage.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Loaded::Found(value),
            Err(e) => Loaded::Corrupt(e.to_string()),
        },
        Ok(None) => Loaded::Missing,
        Err(e) => Loaded::Corrupt(format!("{:#}", e)),
    }
}

fn save_entry<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}

pub fn load_settings(storage: &dyn Storage) -> Loaded<TimerSettings> {
    match load_entry::<TimerSettings>(storage, SETTINGS_KEY) {
        Loaded::Found(settings) => match settings.validate() {
            Ok(()) => Loaded::Found(settings),
            Err(reason) => Loaded::Corrupt(reason),
        },
        other => other,
    }
}

pub fn load_run_state(storage: &dyn Storage) -> Loaded<TimerRunState> {
    load_entry(storage, RUN_STATE_KEY)
}

pub fn save_settings(storage: &dyn Storage, settings: &TimerSettings) -> anyhow::Result<()> {
    save_entry(storage, SETTINGS_KEY, settings)
}

pub fn save_run_state(storage: &dyn Storage, state: &TimerRunState) -> anyhow::Result<()> {
    save_entry(storage, RUN_STATE_KEY, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerMode;
    use chrono::{TimeZone, Utc};

    #[test]
    fn missing_entries_are_reported_as_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(load_settings(&storage), Loaded::Missing);
        assert_eq!(load_run_state(&storage), Loaded::Missing);
    }

    #[test]
    fn unparseable_entries_are_corrupt() {
        let storage = MemoryStorage::new();
        storage.set(SETTINGS_KEY, "{not json").unwrap();
        storage.set(RUN_STATE_KEY, r#"{"currentMode":"nap","timeLeft":3}"#).unwrap();

        assert!(matches!(load_settings(&storage), Loaded::Corrupt(_)));
        assert!(matches!(load_run_state(&storage), Loaded::Corrupt(_)));
    }

    #[test]
    fn zero_durations_count_as_corrupt() {
        let storage = MemoryStorage::new();
        storage
            .set(
                SETTINGS_KEY,
                r#"{"focusDuration":0,"shortBreakDuration":5,"longBreakDuration":15,
                    "autoStartBreaks":false,"autoStartPomodoros":false,"alarmSound":"bell"}"#,
            )
            .unwrap();

        let settings = load_settings(&storage).or_else_log(SETTINGS_KEY, TimerSettings::default);
        assert_eq!(settings, TimerSettings::default());
    }

    #[test]
    fn entries_are_stored_under_separate_keys() {
        let storage = MemoryStorage::new();
        let settings = TimerSettings {
            focus_minutes: 50,
            ..TimerSettings::default()
        };
        let state = TimerRunState {
            mode: TimerMode::LongBreak,
            // Stored with millisecond precision
            ..TimerRunState::fresh(&settings, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
        };
        save_settings(&storage, &settings).unwrap();
        save_run_state(&storage, &state).unwrap();

        let raw = storage.get(SETTINGS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"focusDuration\":50"));
        assert!(!raw.contains("currentMode"));
        assert_eq!(load_settings(&storage), Loaded::Found(settings));
        assert_eq!(load_run_state(&storage), Loaded::Found(state));
    }
}
