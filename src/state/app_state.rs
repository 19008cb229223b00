//! Main application state shared by the HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{TimerMode, TimerSettings, TimerSnapshot, TimerStore};
use crate::tasks::TickDriver;

/// Main application state: the shared timer, its tick driver and server metadata
#[derive(Debug)]
pub struct AppState {
    /// The one timer every client reads and mutates
    pub store: Arc<TimerStore>,
    /// Repeating timer driving the countdown
    pub driver: TickDriver,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Wrap an initialized store. Call `sync_driver` once a runtime is available
    /// to resume a timer that was running before the restart.
    pub fn new(store: TimerStore, port: u16, host: String) -> Self {
        Self {
            store: Arc::new(store),
            driver: TickDriver::new(),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a store operation, record it and bring the tick driver in line
    fn apply<F>(&self, action: &str, operation: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&TimerStore) -> Result<TimerSnapshot, String>,
    {
        let snapshot = operation(&self.store)?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.sync_driver();
        Ok(snapshot)
    }

    /// Start the tick driver if the timer runs, stop it if not
    pub fn sync_driver(&self) {
        self.driver.sync(&self.store);
    }

    pub fn toggle_running(&self) -> Result<TimerSnapshot, String> {
        self.apply("toggle", TimerStore::toggle_running)
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.apply("reset", TimerStore::reset)
    }

    pub fn switch_mode(&self, mode: TimerMode) -> Result<TimerSnapshot, String> {
        self.apply(&format!("switch-{}", mode), |store| store.switch_mode(mode))
    }

    pub fn update_settings(&self, settings: TimerSettings) -> Result<TimerSnapshot, String> {
        self.apply("update-settings", |store| store.update_settings(settings))
    }

    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.store.snapshot()
    }

    /// Stop ticking and write the final state
    pub fn shutdown(&self) {
        self.driver.stop();
        match self.store.persist() {
            Ok(()) => info!("Timer state saved"),
            Err(e) => warn!("Failed to save timer state on shutdown: {}", e),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
