//! Type definitions for deltaboot

mod launcher_config;

pub use launcher_config::*;
