pub mod config;
pub mod database;
mod memory;

pub use config::{Config, SetOutcome};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Opaque string-keyed store the coordinator persists into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/barberq[-dev]/` based on BARBERQ_ENV, or BARBERQ_HOME
/// verbatim when set.
///
/// Set BARBERQ_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("BARBERQ_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BARBERQ_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("barberq-dev")
            } else {
                base_dir.join("barberq")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
