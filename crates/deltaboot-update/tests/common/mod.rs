//! Common test infrastructure for deltaboot-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Artifact naming and build numbers used across tests
//! - `artifacts`: Builders for zip artifacts carrying a manifest
//! - `mock_server`: Wiremock setup for the CI job endpoints
//! - `fakes`: In-memory codec, prompt and relauncher collaborators
//! - `env`: Temporary data directory wired to a mock server

// Not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod artifacts;
pub mod constants;
pub mod env;
pub mod fakes;
pub mod mock_server;

pub use artifacts::*;
pub use constants::*;
pub use env::*;
pub use fakes::*;
pub use mock_server::*;
