mod config;

pub use config::{Config, NotificationsConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/pomoring[-dev]/` based on POMORING_ENV.
///
/// Set POMORING_ENV=dev to use the development data directory, or
/// POMORING_HOME to use an explicit directory instead.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMORING_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMORING_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomoring-dev")
            } else {
                base_dir.join("pomoring")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
