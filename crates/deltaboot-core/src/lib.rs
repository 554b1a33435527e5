//! # deltaboot-core
//!
//! Core library for the deltaboot launcher providing:
//! - Launcher configuration types (launcher.yaml)
//! - Hierarchical configuration loading with environment overrides
//! - The data directory layout shared by every engine component

pub mod config;
pub mod error;
pub mod paths;
pub mod types;
pub mod utils;

pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use paths::LauncherPaths;
pub use types::LauncherConfig;
pub use utils::{default_data_dir, get_home_dir};
