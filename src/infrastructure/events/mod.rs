//! Event Sink Implementations
//!
//! Provides concrete implementations of DeployEventSink:
//! - ConsoleEventSink: `----->` progress markers
//! - JsonEventSink: NDJSON output for CI/automation

mod console;
mod json;

pub use console::{ConsoleEventSink, MARKER};
pub use json::{event_record, stamped, JsonEventSink};
