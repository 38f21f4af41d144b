//! Filesystem Mirror State Store
//!
//! The staging entry of each project doubles as its state record. Entries
//! sit directly under the root, named by the percent-encoded project id
//! (`team/web` -> `team%2Fweb`), so nested projects never share a path.
//!
//!
//! - nothing there: no mirror yet
//! - a directory: a bootstrap clone that never finished
//! - a zero-length file: the remote mirror exists
//!
//! Runs for the same project serialize on an advisory lock kept under
//! `<staging_root>/.locks`. Project ids never start with `.`, so the lock
//! directory cannot shadow a project.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::ports::MirrorStateStore;
use crate::domain::value_objects::{MirrorState, ProjectId};
use crate::error::{DeployGateError, DeployGateResult};

const LOCK_DIR: &str = ".locks";

/// Exclusive per-project lock, released when dropped
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: PathBuf,
}

impl ProjectLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[derive(Debug, Clone)]
pub struct FsMirrorStateStore {
    root: PathBuf,
}

impl FsMirrorStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock_path(&self, project: &ProjectId) -> PathBuf {
        let digest = Sha256::digest(project.as_str().as_bytes());
        let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        self.root.join(LOCK_DIR).join(format!("{}.lock", name))
    }
}

impl MirrorStateStore for FsMirrorStateStore {
    type Guard = ProjectLock;

    fn staging_path(&self, project: &ProjectId) -> PathBuf {
        project.staging_path(&self.root)
    }

    fn load(&self, project: &ProjectId) -> DeployGateResult<MirrorState> {
        let path = self.staging_path(project);
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(MirrorState::Interrupted),
            Ok(_) => Ok(MirrorState::Bootstrapped),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(MirrorState::Uninitialized),
            Err(err) => Err(DeployGateError::state(path, err)),
        }
    }

    fn lock(&self, project: &ProjectId) -> DeployGateResult<ProjectLock> {
        let path = self.lock_path(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DeployGateError::state(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| DeployGateError::state(&path, e))?;

        if file.try_lock_exclusive().is_err() {
            info!(project = %project, "another run holds the project lock, waiting");
            file.lock_exclusive()
                .map_err(|e| DeployGateError::state(&path, e))?;
        }
        debug!(lock = %path.display(), "project lock acquired");

        Ok(ProjectLock { file, path })
    }

    fn clear(&self, project: &ProjectId) -> DeployGateResult<()> {
        let path = self.staging_path(project);
        let result = match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path),
            Ok(_) => fs::remove_file(&path),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => Err(err),
        };
        result.map_err(|e| DeployGateError::state(&path, e))?;
        debug!(path = %path.display(), "staging entry removed");
        Ok(())
    }

    fn mark_bootstrapped(&self, project: &ProjectId) -> DeployGateResult<()> {
        let path = self.staging_path(project);
        let root = &self.root;
        fs::create_dir_all(root).map_err(|e| DeployGateError::state(root, e))?;

        let marker = NamedTempFile::new_in(root).map_err(|e| DeployGateError::state(root, e))?;
        match marker.persist_noclobber(&path) {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
                // Only an existing marker satisfies the request.
                match self.load(project)? {
                    MirrorState::Bootstrapped => Ok(()),
                    _ => Err(DeployGateError::state(path, err.error)),
                }
            }
            Err(err) => Err(DeployGateError::state(path, err.error)),
        }
    }
}
