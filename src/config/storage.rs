//! Storage configuration.

use serde::Deserialize;

/// Order and balance persistence settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Whether the SQLite backend is used; falls back to in-memory
    /// storage when disabled.
    #[serde(default)]
    pub enabled: bool,
    /// Path to the SQLite database file.
    pub path: Option<String>,
}
