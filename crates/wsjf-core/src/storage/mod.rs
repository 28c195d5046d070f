mod config;
pub mod database;
pub mod item_store;

pub use config::{Config, DisplayConfig, StorageConfig};
pub use database::Database;
pub use item_store::{ItemStore, DEFAULT_NAMESPACE};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `WSJF_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/wsjf/`, or `~/.config/wsjf-dev/` when `WSJF_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WSJF_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WSJF_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("wsjf-dev")
            } else {
                base_dir.join("wsjf")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

