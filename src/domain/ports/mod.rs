//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod file_transfer;
pub mod mirror_state_store;
pub mod remote_shell;
pub mod source_repository;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use file_transfer::FileTransfer;
pub use mirror_state_store::MirrorStateStore;
pub use remote_shell::{RemoteCommand, RemoteShell};
pub use source_repository::{RevisionReader, SourceRepository};
