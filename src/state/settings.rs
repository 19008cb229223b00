//! Timer settings structure and validation

use serde::{Deserialize, Serialize};

use super::TimerMode;

/// Sound played when an interval runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSound {
    Bell,
    Digital,
    Gentle,
}

impl AlarmSound {
    /// Tone frequency in Hz used to synthesize the alarm
    pub fn frequency_hz(&self) -> u32 {
        match self {
            AlarmSound::Bell => 800,
            AlarmSound::Digital => 1000,
            AlarmSound::Gentle => 600,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSound::Bell => "bell",
            AlarmSound::Digital => "digital",
            AlarmSound::Gentle => "gentle",
        }
    }
}

/// User-adjustable durations and behavior flags.
///
/// The serialized field names are the ones stored in the settings entry,
/// so the same shape is used on disk and over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(rename = "focusDuration")]
    pub focus_minutes: u32,
    #[serde(rename = "shortBreakDuration")]
    pub short_break_minutes: u32,
    #[serde(rename = "longBreakDuration")]
    pub long_break_minutes: u32,
    #[serde(rename = "autoStartBreaks")]
    pub auto_start_breaks: bool,
    #[serde(rename = "autoStartPomodoros")]
    pub auto_start_focus: bool,
    #[serde(rename = "alarmSound")]
    pub alarm_sound: AlarmSound,
}

impl TimerSettings {
    /// Length of an interval of the given mode, in seconds
    pub fn duration_for(&self, mode: TimerMode) -> u64 {
        let minutes = match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        };
        u64::from(minutes) * 60
    }

    /// Whether the mode entered after a zero-crossing starts on its own
    pub fn auto_starts(&self, mode: TimerMode) -> bool {
        if mode.is_break() {
            self.auto_start_breaks
        } else {
            self.auto_start_focus
        }
    }

    /// Reject settings that would produce an empty interval
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("focusDuration", self.focus_minutes),
            ("shortBreakDuration", self.short_break_minutes),
            ("longBreakDuration", self.long_break_minutes),
        ];
        for (name, minutes) in fields {
            if minutes == 0 {
                return Err(format!("{} must be at least 1 minute", name));
            }
        }
        Ok(())
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            auto_start_breaks: false,
            auto_start_focus: false,
            alarm_sound: AlarmSound::Bell,
        }
    }
}
