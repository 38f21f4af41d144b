//! Deploy Use Case
//!
//! Orchestrates one post-receive run:
//! 1. Gate the push (branch, marker files)
//! 2. Sync the remote mirror (bootstrap or incremental)
//! 3. Run checkout, build, deploy on the remote host
//!
//! This use case is pure orchestration - the rules live in domain services
//! and all I/O goes through ports.

use tracing::info;

use crate::domain::entities::PushEvent;
use crate::domain::ports::{
    DeployEvent, DeployEventSink, FileTransfer, MirrorStateStore, RemoteShell, RevisionReader,
    SourceRepository,
};
use crate::domain::services::GateDecision;
use crate::domain::value_objects::RevisionId;

use super::options::DeployOptions;
use super::result::DeployOutcome;
use super::steps::run_steps;
use super::sync::{SyncExecutor, SyncFailure};

/// Gate decision for `event`, needing only read access to the repository
pub fn evaluate_gate<R>(options: &DeployOptions, event: &PushEvent, repo: &R) -> GateDecision
where
    R: RevisionReader + ?Sized,
{
    let decision = options
        .filter()
        .evaluate(&event.refname, &event.new_revision, repo);
    if let GateDecision::Skip(reason) = &decision {
        info!(
            project = %event.project,
            refname = %event.refname,
            reason = reason.code(),
            "push skipped"
        );
    }
    decision
}

/// Early gate on the ref alone, before the repository is even located.
///
/// `Proceed` only means the marker-file rules still have to run.
pub fn evaluate_ref(
    options: &DeployOptions,
    refname: &str,
    new_revision: &RevisionId,
) -> GateDecision {
    match options.filter().check_ref(refname, new_revision) {
        Some(reason) => {
            info!(refname, reason = reason.code(), "push skipped");
            GateDecision::Skip(reason)
        }
        None => GateDecision::Proceed,
    }
}

/// Deploy use case - parameterized by its ports so tests can swap them
pub struct DeployUseCase<R, S, T, H>
where
    R: SourceRepository,
    S: MirrorStateStore,
    T: FileTransfer,
    H: RemoteShell,
{
    repo: R,
    store: S,
    transfer: T,
    shell: H,
    options: DeployOptions,
}

impl<R, S, T, H> DeployUseCase<R, S, T, H>
where
    R: SourceRepository,
    S: MirrorStateStore,
    T: FileTransfer,
    H: RemoteShell,
{
    pub fn new(repo: R, store: S, transfer: T, shell: H, options: DeployOptions) -> Self {
        Self {
            repo,
            store,
            transfer,
            shell,
            options,
        }
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Gate, then deploy if the gate passes
    pub fn execute(&self, event: &PushEvent, sink: &dyn DeployEventSink) -> DeployOutcome {
        match self.gate(event) {
            GateDecision::Skip(reason) => DeployOutcome::Skipped(reason),
            GateDecision::Proceed => self.deploy(event, sink),
        }
    }

    pub fn gate(&self, event: &PushEvent) -> GateDecision {
        evaluate_gate(&self.options, event, &self.repo)
    }

    /// Sync and run the remote steps. Assumes the gate already passed.
    pub fn deploy(&self, event: &PushEvent, sink: &dyn DeployEventSink) -> DeployOutcome {
        let remote_dir = self.options.remote_dir(&event.project);
        info!(
            project = %event.project,
            revision = %event.new_revision,
            uploader = %event.uploader,
            host = self.shell.host(),
            %remote_dir,
            "deploying"
        );
        sink.on_event(DeployEvent::Started {
            project: event.project.to_string(),
            revision: event.new_revision.to_string(),
            host: self.shell.host().to_string(),
        });

        let executor = SyncExecutor::new(&self.repo, &self.store, &self.transfer, &self.shell);
        let strategy = match executor.run(event, &remote_dir, sink) {
            Ok(strategy) => strategy,
            Err(SyncFailure { strategy, error }) => {
                return DeployOutcome::SyncFailed { strategy, error }
            }
        };

        if let Err((step, error)) = run_steps(&self.shell, event, &remote_dir, &self.options, sink)
        {
            return DeployOutcome::StepFailed { step, error };
        }

        DeployOutcome::Deployed {
            project: event.project.clone(),
            revision: event.new_revision.clone(),
            host: self.shell.host().to_string(),
            strategy,
        }
    }
}
