pub mod config;
pub mod fields;
pub mod item;
pub mod score;

use tracing::debug;
use wsjf_core::{Config, Database};

/// Open the database the configuration points at.
pub fn open_database(config: &Config) -> Result<Database, Box<dyn std::error::Error>> {
    let path = config.database_path()?;
    debug!(path = %path.display(), namespace = %config.storage.namespace, "opening backlog database");
    Ok(Database::open(&path)?)
}
