//! Tick driver: the one repeating timer behind the countdown

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, error, info};

use crate::state::{TickOutcome, TimerStore};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct TickTask {
    id: u64,
    handle: JoinHandle<()>,
}

type TaskSlot = Arc<Mutex<Option<TickTask>>>;

/// Owns at most one running tick task.
///
/// The slot is shared with the task itself: a task only exits after
/// clearing its own slot while the store is paused, both checked under the
/// slot lock. `sync` decides under the same lock, so a start racing with a
/// task on its way out either keeps that task alive or spawns a new one.
#[derive(Debug, Default)]
pub struct TickDriver {
    slot: TaskSlot,
    next_id: AtomicU64,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Option<MutexGuard<'_, Option<TickTask>>> {
        match self.slot.lock() {
            Ok(slot) => Some(slot),
            Err(e) => {
                error!("Failed to lock tick driver: {}", e);
                None
            }
        }
    }

    fn spawn_into(&self, slot: &mut Option<TickTask>, store: Arc<TimerStore>) {
        if let Some(previous) = slot.take() {
            previous.handle.abort();
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(tick_task(store, Arc::clone(&self.slot), id));
        *slot = Some(TickTask { id, handle });
        debug!("Tick driver started (task {})", id);
    }

    /// Start ticking `store`, replacing any task already running
    pub fn start(&self, store: Arc<TimerStore>) {
        if let Some(mut slot) = self.lock() {
            self.spawn_into(&mut slot, store);
        }
    }

    /// Cancel the tick task. Stopping a stopped driver does nothing.
    pub fn stop(&self) {
        let previous = match self.lock() {
            Some(mut slot) => slot.take(),
            None => return,
        };
        if let Some(previous) = previous {
            previous.handle.abort();
            debug!("Tick driver stopped (task {})", previous.id);
        }
    }

    /// Whether a tick task is alive
    pub fn is_active(&self) -> bool {
        self.lock()
            .is_some_and(|slot| slot.as_ref().is_some_and(|task| !task.handle.is_finished()))
    }

    /// Start when the store is running, stop otherwise
    pub fn sync(&self, store: &Arc<TimerStore>) {
        let Some(mut slot) = self.lock() else {
            return;
        };
        match store.is_running() {
            Ok(true) => {
                let alive = slot.as_ref().is_some_and(|task| !task.handle.is_finished());
                if !alive {
                    self.spawn_into(&mut slot, Arc::clone(store));
                }
            }
            Ok(false) => {
                if let Some(previous) = slot.take() {
                    previous.handle.abort();
                    debug!("Tick driver stopped (task {})", previous.id);
                }
            }
            Err(e) => error!("Failed to read timer state: {}", e),
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(task) = slot.take() {
                task.handle.abort();
            }
        }
    }
}

/// Decide whether task `id` may exit, releasing its slot if so.
///
/// A task that no longer owns the slot always exits. The owner keeps
/// ticking if the timer was started again since its last tick.
fn release_slot(store: &TimerStore, slot: &TaskSlot, id: u64) -> bool {
    let mut slot = match slot.lock() {
        Ok(slot) => slot,
        Err(e) => {
            error!("Failed to lock tick driver: {}", e);
            return true;
        }
    };
    if slot.as_ref().map(|task| task.id) != Some(id) {
        return true;
    }
    if let Ok(true) = store.is_running() {
        debug!("Timer restarted before task {} exited, still ticking", id);
        return false;
    }
    *slot = None;
    true
}

/// Decrement once per second until the store pauses
async fn tick_task(store: Arc<TimerStore>, slot: TaskSlot, id: u64) {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        interval.tick().await;

        match store.tick(Utc::now()) {
            Ok(TickOutcome::Counting { remaining_seconds }) => {
                debug!("Tick: {}s left", remaining_seconds);
            }
            Ok(TickOutcome::Crossed { next, running: true }) => {
                info!("{} started automatically", next);
                interval.reset();
            }
            Ok(TickOutcome::Crossed { next, running: false }) => {
                info!("Waiting for {} to be started", next);
                if release_slot(&store, &slot, id) {
                    break;
                }
            }
            Ok(TickOutcome::Idle) => {
                if release_slot(&store, &slot, id) {
                    debug!("Timer paused, tick task exiting");
                    break;
                }
            }
            Err(e) => {
                error!("Tick failed: {}", e);
                if let Ok(mut slot) = slot.lock() {
                    if slot.as_ref().map(|task| task.id) == Some(id) {
                        *slot = None;
                    }
                }
                break;
            }
        }
    }
}
