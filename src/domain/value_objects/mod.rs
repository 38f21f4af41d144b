//! Value Objects
//!
//! Immutable, validated values shared across layers.

mod mirror_state;
mod project;
mod remote_step;
mod revision;

pub use mirror_state::{MirrorState, SyncStrategy};
pub use project::ProjectId;
pub use remote_step::RemoteStep;
pub use revision::RevisionId;
