//! Deploy Event Port
//!
//! Provides an observable interface for a gate run.
//! Enables progress markers, JSON event streams, and debugging.

use std::path::PathBuf;

use crate::domain::value_objects::{MirrorState, RemoteStep, SyncStrategy};

/// Event emitted while a push is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Gate passed; remote work begins
    Started {
        project: String,
        revision: String,
        host: String,
    },

    /// Mirror state was read and a strategy chosen
    StrategyChosen {
        state: MirrorState,
        strategy: SyncStrategy,
    },

    /// A leftover staging directory is being removed before bootstrap
    RecoveringInterrupted { path: PathBuf },

    /// Bootstrap: local working clone being created
    Cloning { path: PathBuf },

    /// Bootstrap: clone being copied to the host
    Transferring { method: String, remote_dir: String },

    /// Bootstrap finished and marker written
    MirrorInitialized { marker: PathBuf },

    /// Incremental: revision being pushed
    Pushing { revision: String, refspec: String },

    /// A remote step is about to run
    StepStarted { step: RemoteStep },

    /// A remote step exited successfully
    StepCompleted { step: RemoteStep },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: `----->` progress markers
/// - JsonEventSink: NDJSON event stream
/// - NoopEventSink: Silent operation
pub trait DeployEventSink {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}
