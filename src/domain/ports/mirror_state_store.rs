//! Mirror State Store Port
//!
//! Persists the per-project "remote mirror exists" fact.

use std::path::PathBuf;

use crate::domain::value_objects::{MirrorState, ProjectId};
use crate::error::DeployGateResult;

pub trait MirrorStateStore {
    /// Held for the duration of a sync; released on drop
    type Guard;

    /// Staging entry for `project`; bootstrap clones into it
    fn staging_path(&self, project: &ProjectId) -> PathBuf;

    /// Current state, from a single metadata lookup
    fn load(&self, project: &ProjectId) -> DeployGateResult<MirrorState>;

    /// Exclusive per-project guard, blocking until available
    fn lock(&self, project: &ProjectId) -> DeployGateResult<Self::Guard>;

    /// Remove whatever is at the staging path (clone directory or marker)
    fn clear(&self, project: &ProjectId) -> DeployGateResult<()>;

    /// Atomically place the zero-length marker at the staging path.
    ///
    /// Fails if a directory is still there; succeeds if the marker already exists.
    fn mark_bootstrapped(&self, project: &ProjectId) -> DeployGateResult<()>;
}
