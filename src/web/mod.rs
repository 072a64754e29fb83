//! Web interface module
//!
//! Exposes the record store over a small JSON API. Every response is an
//! envelope with a `success` flag; errors carry an `error` message.

mod server;
mod handlers;
mod error;

pub use server::{router, run_web_server, AVAILABLE_ROUTES};
pub use error::ApiError;
