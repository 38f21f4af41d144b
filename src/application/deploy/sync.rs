//! Remote Sync Executor
//!
//! Brings the remote mirror up to the pushed revision. The first run for a
//! project clones locally and copies the clone over; every later run is a
//! `git push` into the remote clone's tracking ref. The whole transition
//! runs under the project lock, and the state is re-read once the lock is
//! held.

use tracing::{info, warn};

use crate::domain::entities::PushEvent;
use crate::domain::ports::{
    DeployEvent, DeployEventSink, FileTransfer, MirrorStateStore, RemoteShell, SourceRepository,
};
use crate::domain::value_objects::{MirrorState, SyncStrategy};
use crate::error::{DeployGateError, DeployGateResult};

/// A sync that did not complete
#[derive(Debug)]
pub struct SyncFailure {
    pub strategy: SyncStrategy,
    pub error: DeployGateError,
}

pub struct SyncExecutor<'a, R, S, T, H> {
    repo: &'a R,
    store: &'a S,
    transfer: &'a T,
    shell: &'a H,
}

impl<'a, R, S, T, H> SyncExecutor<'a, R, S, T, H>
where
    R: SourceRepository,
    S: MirrorStateStore,
    T: FileTransfer,
    H: RemoteShell,
{
    pub fn new(repo: &'a R, store: &'a S, transfer: &'a T, shell: &'a H) -> Self {
        Self {
            repo,
            store,
            transfer,
            shell,
        }
    }

    /// Sync `event.new_revision` into `remote_dir`, returning the strategy used.
    pub fn run(
        &self,
        event: &PushEvent,
        remote_dir: &str,
        sink: &dyn DeployEventSink,
    ) -> Result<SyncStrategy, SyncFailure> {
        // Strategy is unknown until the state is read; lock failures count
        // as bootstrap failures since nothing has been synced yet.
        let _guard = self
            .store
            .lock(&event.project)
            .map_err(|error| SyncFailure {
                strategy: SyncStrategy::Bootstrap,
                error,
            })?;

        let state = self.store.load(&event.project).map_err(|error| SyncFailure {
            strategy: SyncStrategy::Bootstrap,
            error,
        })?;
        let strategy = state.strategy();
        info!(project = %event.project, %state, %strategy, "mirror state");
        sink.on_event(DeployEvent::StrategyChosen { state, strategy });

        let result = match strategy {
            SyncStrategy::Bootstrap => self.bootstrap(event, state, remote_dir, sink),
            SyncStrategy::Incremental => self.push(event, remote_dir, sink),
        };
        result
            .map(|()| strategy)
            .map_err(|error| SyncFailure { strategy, error })
    }

    fn bootstrap(
        &self,
        event: &PushEvent,
        state: MirrorState,
        remote_dir: &str,
        sink: &dyn DeployEventSink,
    ) -> DeployGateResult<()> {
        let project = &event.project;
        let staging = self.store.staging_path(project);

        if state == MirrorState::Interrupted {
            warn!(path = %staging.display(), "removing interrupted bootstrap");
            sink.on_event(DeployEvent::RecoveringInterrupted {
                path: staging.clone(),
            });
            self.store.clear(project)?;
        }

        sink.on_event(DeployEvent::Cloning {
            path: staging.clone(),
        });
        let copied = self.repo.clone_into(&staging).and_then(|()| {
            sink.on_event(DeployEvent::Transferring {
                method: self.transfer.name().to_string(),
                remote_dir: remote_dir.to_string(),
            });
            self.transfer.transfer(&staging, remote_dir)
        });

        if let Err(err) = copied {
            // Best effort; a leftover directory is recovered on the next run.
            if let Err(cleanup) = self.store.clear(project) {
                warn!(path = %staging.display(), error = %cleanup, "could not remove staging clone");
            }
            return Err(err);
        }

        self.store.clear(project)?;
        self.store.mark_bootstrapped(project)?;
        info!(marker = %staging.display(), "remote mirror initialized");
        sink.on_event(DeployEvent::MirrorInitialized { marker: staging });
        Ok(())
    }

    fn push(
        &self,
        event: &PushEvent,
        remote_dir: &str,
        sink: &dyn DeployEventSink,
    ) -> DeployGateResult<()> {
        let branch = event.branch().unwrap_or(&event.refname);
        let refspec = format!("+{}:refs/remotes/origin/{}", event.new_revision, branch);
        let url = self.shell.repository_url(remote_dir);

        sink.on_event(DeployEvent::Pushing {
            revision: event.new_revision.to_string(),
            refspec: refspec.clone(),
        });
        self.repo.push(&url, &refspec)
    }
}
