//! Deploy Outcome
//!
//! The four ways a gate run can end. Only the two failure kinds map to a
//! non-zero exit.

use crate::domain::services::SkipReason;
use crate::domain::value_objects::{ProjectId, RemoteStep, RevisionId, SyncStrategy};
use crate::error::DeployGateError;

#[derive(Debug)]
pub enum DeployOutcome {
    /// Gate declined the push; nothing remote happened
    Skipped(SkipReason),
    /// Sync and all three remote steps succeeded
    Deployed {
        project: ProjectId,
        revision: RevisionId,
        host: String,
        strategy: SyncStrategy,
    },
    /// Clone, transfer, push, or state bookkeeping failed
    SyncFailed {
        strategy: SyncStrategy,
        error: DeployGateError,
    },
    /// A remote step exited non-zero or timed out
    StepFailed {
        step: RemoteStep,
        error: DeployGateError,
    },
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Skipped(_) | Self::Deployed { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Stable identifier for machine-readable output
    pub fn status(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::Deployed { .. } => "deployed",
            Self::SyncFailed { .. } => "sync_failed",
            Self::StepFailed { .. } => "step_failed",
        }
    }
}
