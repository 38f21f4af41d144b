//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `git` - Local bare repository via the git CLI
//! - `state` - Mirror state markers and project locks on disk
//! - `remote/` - ssh remote shell and rsync transfer
//! - `events/` - Console and NDJSON event sinks
//! - `process`, `session`, `shell` - Child process plumbing shared by the above

pub mod events;
pub mod git;
pub mod process;
pub mod remote;
pub mod session;
pub mod shell;
pub mod state;

// Re-export for convenience
pub use events::{ConsoleEventSink, JsonEventSink};
pub use git::{GitCli, GitTimeouts};
pub use process::{CommandOutput, OutputMode, ProcessRunner};
pub use remote::{ssh_command_line, RemoteTimeout, RsyncTransfer, SshShell};
pub use session::RemoteSession;
pub use state::{FsMirrorStateStore, ProjectLock};
