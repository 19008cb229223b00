//! Mode transition policy and startup reconciliation
//!
//! Pure functions over `TimerRunState`, free of timers, locks and storage so
//! they can be exercised directly.

use chrono::{DateTime, Utc};

use super::{TimerMode, TimerRunState, TimerSettings};

/// Every n-th completed focus interval is followed by a long break
pub const LONG_BREAK_EVERY: u64 = 4;

/// Mode that follows `finished`, given the completed focus count after the
/// increment for the interval that just ended
pub fn next_mode(finished: TimerMode, completed_after: u64) -> TimerMode {
    match finished {
        TimerMode::Focus if completed_after > 0 && completed_after % LONG_BREAK_EVERY == 0 => {
            TimerMode::LongBreak
        }
        TimerMode::Focus => TimerMode::ShortBreak,
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
    }
}

/// Apply the zero-crossing transition to `state`
pub fn complete_interval(
    state: &TimerRunState,
    settings: &TimerSettings,
    now: DateTime<Utc>,
) -> TimerRunState {
    let completed = if state.mode == TimerMode::Focus {
        state.completed_focus_sessions + 1
    } else {
        state.completed_focus_sessions
    };
    let mode = next_mode(state.mode, completed);
    let running = settings.auto_starts(mode);

    TimerRunState {
        mode,
        remaining_seconds: settings.duration_for(mode),
        running,
        completed_focus_sessions: completed,
        last_tick: if running { now } else { state.last_tick },
    }
}

/// Result of reconciling persisted state against the wall clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub state: TimerRunState,
    /// The interval ran out while nobody was ticking and the transition was applied
    pub crossed: bool,
}

/// Bring a persisted run state up to date with `now`.
///
/// A running countdown loses the whole seconds elapsed since `last_tick`.
/// If that empties it, the zero-crossing transition is applied once here
/// rather than left pending.
pub fn reconcile(
    persisted: TimerRunState,
    settings: &TimerSettings,
    now: DateTime<Utc>,
) -> Reconciled {
    let duration = settings.duration_for(persisted.mode);
    let mut state = persisted;

    if state.running {
        let elapsed = (now - state.last_tick).num_seconds().max(0) as u64;
        state.remaining_seconds = state.remaining_seconds.saturating_sub(elapsed).min(duration);

        if state.remaining_seconds == 0 {
            return Reconciled {
                state: complete_interval(&state, settings, now),
                crossed: true,
            };
        }
        state.last_tick = now;
    } else if state.remaining_seconds == 0 || state.remaining_seconds > duration {
        state.remaining_seconds = duration;
    }

    Reconciled {
        state,
        crossed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn running_focus(remaining: u64, completed: u64) -> TimerRunState {
        TimerRunState {
            mode: TimerMode::Focus,
            remaining_seconds: remaining,
            running: true,
            completed_focus_sessions: completed,
            last_tick: t0(),
        }
    }

    #[test]
    fn every_fourth_focus_earns_a_long_break() {
        for completed in 1..=16 {
            let expected = if completed % 4 == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            };
            assert_eq!(next_mode(TimerMode::Focus, completed), expected, "completed={}", completed);
        }
    }

    #[test]
    fn breaks_always_return_to_focus() {
        for completed in [0, 3, 4, 7] {
            assert_eq!(next_mode(TimerMode::ShortBreak, completed), TimerMode::Focus);
            assert_eq!(next_mode(TimerMode::LongBreak, completed), TimerMode::Focus);
        }
    }

    #[test]
    fn finishing_focus_counts_the_session_and_pauses() {
        let settings = TimerSettings::default();
        let next = complete_interval(&running_focus(0, 0), &settings, t0());

        assert_eq!(next.mode, TimerMode::ShortBreak);
        assert_eq!(next.remaining_seconds, 300);
        assert!(!next.running);
        assert_eq!(next.completed_focus_sessions, 1);
    }

    #[test]
    fn fourth_focus_auto_starts_long_break() {
        let settings = TimerSettings {
            auto_start_breaks: true,
            ..TimerSettings::default()
        };
        let now = t0() + Duration::seconds(5);
        let next = complete_interval(&running_focus(0, 3), &settings, now);

        assert_eq!(next.mode, TimerMode::LongBreak);
        assert_eq!(next.remaining_seconds, 900);
        assert!(next.running);
        assert_eq!(next.last_tick, now);
    }

    #[test]
    fn finishing_break_keeps_the_count() {
        let settings = TimerSettings {
            auto_start_focus: true,
            ..TimerSettings::default()
        };
        let state = TimerRunState {
            mode: TimerMode::LongBreak,
            ..running_focus(0, 4)
        };
        let next = complete_interval(&state, &settings, t0());

        assert_eq!(next.mode, TimerMode::Focus);
        assert_eq!(next.completed_focus_sessions, 4);
        assert_eq!(next.remaining_seconds, 1500);
        assert!(next.running);
    }

    #[test]
    fn reconcile_subtracts_elapsed_wall_time() {
        let settings = TimerSettings::default();
        let now = t0() + Duration::milliseconds(100_900);
        let result = reconcile(running_focus(600, 0), &settings, now);

        assert!(!result.crossed);
        assert_eq!(result.state.remaining_seconds, 500);
        assert!(result.state.running);
        assert_eq!(result.state.last_tick, now);
    }

    #[test]
    fn reconcile_applies_transition_once_when_time_ran_out() {
        let settings = TimerSettings::default();
        // Long enough to cover several intervals; only one transition happens
        let now = t0() + Duration::hours(3);
        let result = reconcile(running_focus(60, 1), &settings, now);

        assert!(result.crossed);
        assert_eq!(result.state.mode, TimerMode::ShortBreak);
        assert_eq!(result.state.completed_focus_sessions, 2);
        assert_eq!(result.state.remaining_seconds, 300);
        assert!(!result.state.running);
    }

    #[test]
    fn reconcile_exact_expiry_counts_as_crossing() {
        let settings = TimerSettings::default();
        let result = reconcile(running_focus(60, 0), &settings, t0() + Duration::seconds(60));
        assert!(result.crossed);
        assert_eq!(result.state.mode, TimerMode::ShortBreak);
    }

    #[test]
    fn reconcile_ignores_clock_going_backwards() {
        let settings = TimerSettings::default();
        let result = reconcile(running_focus(600, 0), &settings, t0() - Duration::seconds(30));
        assert_eq!(result.state.remaining_seconds, 600);
        assert!(!result.crossed);
    }

    #[test]
    fn reconcile_leaves_paused_timer_alone() {
        let settings = TimerSettings::default();
        let paused = TimerRunState {
            running: false,
            ..running_focus(700, 0)
        };
        let result = reconcile(paused.clone(), &settings, t0() + Duration::hours(1));
        assert_eq!(result.state, paused);
        assert!(!result.crossed);
    }

    #[test]
    fn reconcile_refills_empty_or_oversized_paused_timer() {
        let settings = TimerSettings::default();
        for remaining in [0, 9_999] {
            let paused = TimerRunState {
                running: false,
                ..running_focus(remaining, 0)
            };
            let result = reconcile(paused, &settings, t0());
            assert_eq!(result.state.remaining_seconds, 1500);
        }
    }
}
