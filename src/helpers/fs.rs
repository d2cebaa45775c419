//! File System Utilities
//!
//! Local directories for preferences and log files.

use crate::constants::{PROJECT_APPLICATION, PROJECT_ORGANIZATION, PROJECT_QUALIFIER};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORGANIZATION, PROJECT_APPLICATION).ok_or_else(
        || Error::Invalid {
            message: "Could not determine project directories".to_string(),
        },
    )
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}

/// Get or create the application's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/symlink-manager/` or `$XDG_CONFIG_HOME/symlink-manager/`
/// - **macOS**: `~/Library/Application Support/com.symlink-manager.symlink-manager/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\symlink-manager\symlink-manager\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    ensure_dir(dirs.config_dir())
}

/// Get or create the data directory (rolling log files live here)
pub fn get_or_create_data_dir() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    ensure_dir(dirs.data_dir())
}

/// Check if running in development mode
pub fn is_development() -> bool {
    cfg!(debug_assertions)
}
