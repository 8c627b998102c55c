//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use std::path::PathBuf;

use runtime::RuntimeConfig;

/// Get the platform-specific log directory
///
/// - macOS: `~/Library/Caches/action-plans/logs`
/// - Linux: `~/.cache/action-plans/logs` (or `$XDG_CACHE_HOME/action-plans/logs`)
/// - Windows: `%LOCALAPPDATA%\action-plans\logs`
/// - Fallback: `/tmp/action-plans/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "action-plans")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/action-plans"))
        .join("logs")
}

/// Directory holding saved snapshots
///
/// `SAVE_DATA_DIR` wins over the platform data directory, matching
/// [`RuntimeConfig::from_env`].
pub fn snapshot_dir() -> PathBuf {
    RuntimeConfig::from_env()
        .save_dir
        .unwrap_or_else(RuntimeConfig::default_save_dir)
}
