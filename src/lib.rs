//! deploygate - post-receive deployment gate
//!
//! Runs after a push lands in a server-side repository. Pushes to the target
//! branch that carry `build` and `deploy` scripts are mirrored to a remote
//! host (full copy the first time, `git push` afterwards), checked out there,
//! then built and deployed over ssh. Everything else is skipped.
//!
//! ## Layers
//!
//! - `domain` - Push events, gate rules, mirror state, and the ports
//! - `application` - The deploy and mirror-maintenance use cases
//! - `infrastructure` - git, ssh, rsync, and on-disk state adapters
//! - `presentation` - CLI, wiring, and final output

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use config::Config;
pub use domain::entities::PushEvent;
pub use domain::value_objects::{MirrorState, ProjectId, RemoteStep, RevisionId, SyncStrategy};
pub use error::{DeployGateError, DeployGateResult};
