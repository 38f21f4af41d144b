//! JSON Event Sink
//!
//! Outputs gate events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeployEventSink};

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one record, stamping it with the current time
    pub fn emit(&self, record: serde_json::Value) {
        let record = stamped(record);
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", record);
            let _ = writer.flush();
        }
    }
}

/// Add a `timestamp` field to object records
pub fn stamped(mut record: serde_json::Value) -> serde_json::Value {
    if let Some(object) = record.as_object_mut() {
        object.insert(
            "timestamp".to_string(),
            serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }
    record
}

/// JSON record for `event`, without a timestamp
pub fn event_record(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Started {
            project,
            revision,
            host,
        } => serde_json::json!({
            "event": "start",
            "project": project,
            "revision": revision,
            "host": host,
        }),

        DeployEvent::StrategyChosen { state, strategy } => serde_json::json!({
            "event": "strategy",
            "state": state.as_str(),
            "strategy": strategy.as_str(),
        }),

        DeployEvent::RecoveringInterrupted { path } => serde_json::json!({
            "event": "recovering",
            "path": path.display().to_string(),
        }),

        DeployEvent::Cloning { path } => serde_json::json!({
            "event": "clone",
            "path": path.display().to_string(),
        }),

        DeployEvent::Transferring { method, remote_dir } => serde_json::json!({
            "event": "transfer",
            "method": method,
            "remote_dir": remote_dir,
        }),

        DeployEvent::MirrorInitialized { marker } => serde_json::json!({
            "event": "mirror_initialized",
            "marker": marker.display().to_string(),
        }),

        DeployEvent::Pushing { revision, refspec } => serde_json::json!({
            "event": "push",
            "revision": revision,
            "refspec": refspec,
        }),

        DeployEvent::StepStarted { step } => serde_json::json!({
            "event": "step_start",
            "step": step.as_str(),
        }),

        DeployEvent::StepCompleted { step } => serde_json::json!({
            "event": "step_complete",
            "step": step.as_str(),
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.emit(event_record(&event));
    }
}
