//! Mirror Maintenance
//!
//! `status` and `reset` for operators. Reset takes the project lock, so it
//! never races a sync in progress.

use tracing::info;

use crate::domain::ports::MirrorStateStore;
use crate::domain::value_objects::{MirrorState, ProjectId};
use crate::error::DeployGateResult;

pub struct MirrorUseCase<S: MirrorStateStore> {
    store: S,
}

impl<S: MirrorStateStore> MirrorUseCase<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn status(&self, project: &ProjectId) -> DeployGateResult<MirrorState> {
        self.store.load(project)
    }

    /// Forget the mirror; returns the state it was in
    pub fn reset(&self, project: &ProjectId) -> DeployGateResult<MirrorState> {
        let _guard = self.store.lock(project)?;
        let previous = self.store.load(project)?;
        if previous != MirrorState::Uninitialized {
            self.store.clear(project)?;
            info!(%project, %previous, "mirror state reset");
        }
        Ok(previous)
    }
}
