//! The timer state store: single source of truth for settings and countdown

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    transition::{complete_interval, reconcile},
    TimerMode, TimerRunState, TimerSettings, TimerSnapshot,
};
use crate::{
    services::AlarmPlayer,
    storage::{self, Storage, RUN_STATE_KEY, SETTINGS_KEY},
};

/// What one tick of the driver did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is paused; the driver should stop
    Idle,
    /// Decremented, still counting
    Counting { remaining_seconds: u64 },
    /// Reached zero and moved on to `next`, which may already be running
    Crossed { next: TimerMode, running: bool },
}

#[derive(Debug)]
struct TimerInner {
    settings: TimerSettings,
    run: TimerRunState,
    /// Bumped on every change that needs writing out
    revision: u64,
}

impl TimerInner {
    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(&self.run, &self.settings)
    }

    /// Copy the current state out for writing once the lock is released
    fn stage(&mut self) -> PendingWrite {
        self.revision += 1;
        PendingWrite {
            revision: self.revision,
            settings: self.settings.clone(),
            run: self.run.clone(),
        }
    }
}

#[derive(Debug)]
struct PendingWrite {
    revision: u64,
    settings: TimerSettings,
    run: TimerRunState,
}

/// Holds the one timer shared by every client of the process
pub struct TimerStore {
    inner: Mutex<TimerInner>,
    /// Revision last written to storage
    written: Mutex<u64>,
    storage: Arc<dyn Storage>,
    alarm: Arc<dyn AlarmPlayer>,
}

impl TimerStore {
    /// Load persisted settings and run state, reconciled against the current time
    pub fn initialize(storage: Arc<dyn Storage>, alarm: Arc<dyn AlarmPlayer>) -> Self {
        Self::initialize_at(storage, alarm, Utc::now())
    }

    pub fn initialize_at(
        storage: Arc<dyn Storage>,
        alarm: Arc<dyn AlarmPlayer>,
        now: DateTime<Utc>,
    ) -> Self {
        let settings = storage::load_settings(storage.as_ref())
            .or_else_log(SETTINGS_KEY, TimerSettings::default);
        let persisted = storage::load_run_state(storage.as_ref())
            .or_else_log(RUN_STATE_KEY, || TimerRunState::fresh(&settings, now));

        let reconciled = reconcile(persisted, &settings, now);
        if reconciled.crossed {
            info!(
                "Interval ran out while stopped, moved on to {}",
                reconciled.state.mode
            );
            alarm.play(settings.alarm_sound);
        }
        info!(
            "Timer loaded: mode={}, remaining={}s, running={}, completed={}",
            reconciled.state.mode,
            reconciled.state.remaining_seconds,
            reconciled.state.running,
            reconciled.state.completed_focus_sessions
        );

        let store = Self {
            inner: Mutex::new(TimerInner {
                settings,
                run: reconciled.state,
                revision: 0,
            }),
            written: Mutex::new(0),
            storage,
            alarm,
        };
        if let Err(e) = store.persist() {
            warn!("Failed to persist reconciled timer: {}", e);
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, TimerInner>, String> {
        self.inner.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Write both entries, called without the state lock held.
    ///
    /// Writes are serialized on `written` and a write older than the last one
    /// stored is dropped, so storage never goes back in time. Storage failures
    /// are logged, never propagated.
    fn write(&self, pending: PendingWrite) {
        let mut written = match self.written.lock() {
            Ok(written) => written,
            Err(e) => {
                warn!("Failed to lock timer storage: {}", e);
                return;
            }
        };
        if pending.revision <= *written {
            debug!("Skipping stale write of revision {}", pending.revision);
            return;
        }

        if let Err(e) = storage::save_settings(self.storage.as_ref(), &pending.settings) {
            warn!("Failed to persist timer settings: {:#}", e);
        }
        if let Err(e) = storage::save_run_state(self.storage.as_ref(), &pending.run) {
            warn!("Failed to persist timer state: {:#}", e);
        }
        *written = pending.revision;
    }

    /// Apply a mutation under the lock, then persist the result
    fn mutate<F>(&self, action: &str, updater: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut TimerInner, DateTime<Utc>),
    {
        let mut inner = self.lock()?;
        updater(&mut inner, Utc::now());
        let pending = inner.stage();
        let snapshot = inner.snapshot();
        drop(inner);

        self.write(pending);

        debug!(
            "{}: mode={}, remaining={}s, running={}",
            action, snapshot.mode, snapshot.remaining_seconds, snapshot.running
        );
        Ok(snapshot)
    }

    /// Start or pause the countdown
    pub fn toggle_running(&self) -> Result<TimerSnapshot, String> {
        self.mutate("toggle", |inner, now| {
            if inner.run.running {
                inner.run.running = false;
                info!("Timer paused at {}s", inner.run.remaining_seconds);
            } else if inner.run.remaining_seconds == 0 {
                warn!("Refusing to start an empty {} interval", inner.run.mode);
            } else {
                inner.run.running = true;
                inner.run.last_tick = now;
                info!("Timer started: {} with {}s left", inner.run.mode, inner.run.remaining_seconds);
            }
        })
    }

    /// Pause and refill the current interval; the session count is kept
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.mutate("reset", |inner, _| {
            inner.run.running = false;
            inner.run.remaining_seconds = inner.settings.duration_for(inner.run.mode);
            info!("Timer reset to {}s", inner.run.remaining_seconds);
        })
    }

    /// Jump to another mode at full length. Manual switches never auto-start.
    pub fn switch_mode(&self, mode: TimerMode) -> Result<TimerSnapshot, String> {
        self.mutate("switch-mode", |inner, _| {
            inner.run.mode = mode;
            inner.run.remaining_seconds = inner.settings.duration_for(mode);
            inner.run.running = false;
            info!("Switched to {}", mode);
        })
    }

    /// Replace the settings wholesale.
    ///
    /// A paused timer picks up the new duration immediately; a running one
    /// keeps its countdown until the next reset or switch.
    pub fn update_settings(&self, settings: TimerSettings) -> Result<TimerSnapshot, String> {
        settings.validate()?;
        self.mutate("update-settings", |inner, _| {
            inner.settings = settings;
            if !inner.run.running {
                inner.run.remaining_seconds = inner.settings.duration_for(inner.run.mode);
            }
            info!("Settings updated: {:?}", inner.settings);
        })
    }

    /// Advance the countdown by one second
    pub fn tick(&self, now: DateTime<Utc>) -> Result<TickOutcome, String> {
        let mut inner = self.lock()?;
        if !inner.run.running || inner.run.remaining_seconds == 0 {
            inner.run.running = false;
            return Ok(TickOutcome::Idle);
        }

        inner.run.remaining_seconds -= 1;
        inner.run.last_tick = now;

        let outcome = if inner.run.remaining_seconds == 0 {
            let finished = inner.run.mode;
            let next = complete_interval(&inner.run, &inner.settings, now);
            info!(
                "{} finished, next {} ({}s, running={}), completed={}",
                finished, next.mode, next.remaining_seconds, next.running,
                next.completed_focus_sessions
            );
            let outcome = TickOutcome::Crossed {
                next: next.mode,
                running: next.running,
            };
            inner.run = next;
            outcome
        } else {
            TickOutcome::Counting {
                remaining_seconds: inner.run.remaining_seconds,
            }
        };

        let pending = inner.stage();
        let sound = inner.settings.alarm_sound;
        drop(inner);

        self.write(pending);

        if matches!(outcome, TickOutcome::Crossed { .. }) {
            self.alarm.play(sound);
        }
        Ok(outcome)
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.lock().map(|inner| inner.snapshot())
    }

    pub fn settings(&self) -> Result<TimerSettings, String> {
        self.lock().map(|inner| inner.settings.clone())
    }

    pub fn is_running(&self) -> Result<bool, String> {
        self.lock().map(|inner| inner.run.running)
    }

    /// Write the current state out, stamping a running timer with the current time
    pub fn persist(&self) -> Result<(), String> {
        let mut inner = self.lock()?;
        if inner.run.running {
            inner.run.last_tick = Utc::now();
        }
        let pending = inner.stage();
        drop(inner);

        self.write(pending);
        Ok(())
    }
}

impl std::fmt::Debug for TimerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
