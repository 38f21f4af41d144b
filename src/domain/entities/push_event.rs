//! Push Event
//!
//! The ref update that triggered this invocation. Built once from the
//! hook arguments and never mutated.

use crate::domain::value_objects::{ProjectId, RevisionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub project: ProjectId,
    pub refname: String,
    pub uploader: String,
    pub old_revision: RevisionId,
    pub new_revision: RevisionId,
}

impl PushEvent {
    pub fn new(
        project: ProjectId,
        refname: impl Into<String>,
        uploader: impl Into<String>,
        old_revision: RevisionId,
        new_revision: RevisionId,
    ) -> Self {
        Self {
            project,
            refname: refname.into(),
            uploader: uploader.into(),
            old_revision,
            new_revision,
        }
    }

    /// Branch name when the ref is under `refs/heads/`
    pub fn branch(&self) -> Option<&str> {
        self.refname.strip_prefix("refs/heads/")
    }
}
