//! Alarm playback when an interval runs out
//!
//! Playback is best effort: a missing player, a blocked audio device or a
//! non-zero exit is logged and otherwise ignored.

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use crate::state::AlarmSound;

/// Seconds the alarm tone lasts
pub const ALARM_SECONDS: u32 = 1;
/// Playback volume passed to the player
pub const ALARM_VOLUME: &str = "0.3";

/// Something that can sound the alarm. Must not block the caller.
pub trait AlarmPlayer: Send + Sync {
    fn play(&self, sound: AlarmSound);
}

/// Plays a synthesized tone through an external SoX-compatible player
#[derive(Debug, Clone)]
pub struct CommandAlarm {
    program: String,
}

impl CommandAlarm {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    /// Arguments producing a sine tone at the sound's frequency
    pub fn args_for(sound: AlarmSound) -> Vec<String> {
        vec![
            "-q".to_string(),
            "-n".to_string(),
            "synth".to_string(),
            ALARM_SECONDS.to_string(),
            "sine".to_string(),
            sound.frequency_hz().to_string(),
            "vol".to_string(),
            ALARM_VOLUME.to_string(),
        ]
    }
}

impl AlarmPlayer for CommandAlarm {
    fn play(&self, sound: AlarmSound) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot play {} alarm without a runtime: {}", sound.as_str(), e);
                return;
            }
        };

        let program = self.program.clone();
        info!("Playing {} alarm", sound.as_str());
        handle.spawn(async move {
            if let Err(e) = run_player(&program, sound).await {
                warn!("Alarm playback failed: {}", e);
            }
        });
    }
}

async fn run_player(program: &str, sound: AlarmSound) -> Result<(), String> {
    let output = Command::new(program)
        .args(CommandAlarm::args_for(sound))
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} exited with {}: {}", program, output.status, stderr.trim()));
    }

    debug!("Alarm player finished");
    Ok(())
}

/// Alarm that only logs, used with `--silent`
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlarm;

impl AlarmPlayer for SilentAlarm {
    fn play(&self, sound: AlarmSound) {
        info!("Interval finished ({} alarm muted)", sound.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_matches_sound() {
        let args = CommandAlarm::args_for(AlarmSound::Digital);
        assert_eq!(args[5], "1000");
        assert_eq!(CommandAlarm::args_for(AlarmSound::Gentle)[5], "600");
        assert_eq!(CommandAlarm::args_for(AlarmSound::Bell)[5], "800");
    }

    #[test]
    fn playing_outside_a_runtime_is_harmless() {
        CommandAlarm::new("definitely-not-a-player").play(AlarmSound::Bell);
    }

    #[tokio::test]
    async fn missing_player_is_swallowed() {
        CommandAlarm::new("definitely-not-a-player").play(AlarmSound::Bell);
        let result = run_player("definitely-not-a-player", AlarmSound::Bell).await;
        assert!(result.is_err());
    }
}
