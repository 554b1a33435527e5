//! Shared utility functions for deltaboot crates

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Name of the per-user data directory under the home directory
pub const DATA_DIR_NAME: &str = ".deltaboot";

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// wrappers which relocate HOME are respected.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or(Error::NoHomeDir)
}

/// Default data directory (~/.deltaboot)
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(get_home_dir()?.join(DATA_DIR_NAME))
}
