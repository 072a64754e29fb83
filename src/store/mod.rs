//! Record storage module
//!
//! Provides the record model, the JSON file backing and the time-to-live
//! store built on top of them. Independent of the HTTP layer.

mod record;
mod file;
mod records;

pub use record::{validate, Payload, Record, RECORD_KIND, REQUIRED_FIELDS};
pub use file::{FileStore, RecordMap};
pub use records::{RecordStore, StoreStats};
