mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, SlotsConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `TEMPOPLAN_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/tempoplan[-dev]/`, with the `-dev` suffix selected by
/// `TEMPOPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TEMPOPLAN_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TEMPOPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tempoplan-dev")
            } else {
                base_dir.join("tempoplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
