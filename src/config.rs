//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// Directory name used under the platform data directory
pub const APP_DIR: &str = "pomodoro-timer";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-timer")]
#[command(about = "A state-managed HTTP server running a persistent Pomodoro timer")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the settings and timer state files
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Program used to play the alarm tone (SoX `play` compatible)
    #[arg(long, default_value = "play")]
    pub alarm_command: String,

    /// Do not play any alarm sound
    #[arg(long)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Where state lives: the flag, else the platform data dir, else `./.pomodoro-timer`
    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|mut path| {
                path.push(APP_DIR);
                path
            })
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
    }
}
