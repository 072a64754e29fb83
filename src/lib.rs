//! BuildVault - a small JSON API for ephemeral talent builds
//!
//! Builds are kept in a single JSON file and disappear after a fixed
//! lifetime:
//! - `store` owns the file and the time-to-live rules
//! - `sweeper` purges expired builds in the background
//! - `web` exposes the store over HTTP

pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod sweeper;
pub mod web;

/// Re-export commonly used types
pub use config::Config;
pub use error::{Result, StoreError, ValidationError};
pub use store::{Payload, Record, RecordStore, StoreStats};
pub use sweeper::Sweeper;
