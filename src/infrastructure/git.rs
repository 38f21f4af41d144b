//! Git CLI Repository
//!
//! Implements the source repository ports by shelling out to `git` against
//! the hook's bare repository. Every invocation runs inside the session
//! environment, so only `--git-dir` decides which repository is used.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use super::process::{OutputMode, ProcessRunner};
use super::session::RemoteSession;
use crate::domain::ports::{RevisionReader, SourceRepository};
use crate::domain::value_objects::RevisionId;
use crate::error::DeployGateResult;

#[derive(Debug, Clone, Default)]
pub struct GitTimeouts {
    pub clone: Option<Duration>,
    pub push: Option<Duration>,
}

pub struct GitCli {
    git: String,
    repository: PathBuf,
    /// Value for `GIT_SSH_COMMAND` when pushing
    ssh_command: String,
    session: Rc<RemoteSession>,
    runner: ProcessRunner,
    timeouts: GitTimeouts,
}

impl GitCli {
    pub fn new(
        git: impl Into<String>,
        repository: impl Into<PathBuf>,
        ssh_command: impl Into<String>,
        session: Rc<RemoteSession>,
        runner: ProcessRunner,
        timeouts: GitTimeouts,
    ) -> Self {
        Self {
            git: git.into(),
            repository: repository.into(),
            ssh_command: ssh_command.into(),
            session,
            runner,
            timeouts,
        }
    }

    fn git(&self) -> std::process::Command {
        let mut cmd = self.session.command(&self.git);
        cmd.arg("--git-dir").arg(&self.repository);
        cmd
    }
}

impl RevisionReader for GitCli {
    fn read_file(&self, revision: &RevisionId, path: &str) -> DeployGateResult<Option<String>> {
        let object = format!("{}:{}", revision, path);

        // `-t` first: a directory (tree) of the same name is not a file.
        let mut kind = self.git();
        kind.args(["cat-file", "-t", &object]);
        let output = self.runner.run(&mut kind, OutputMode::Capture, None)?;
        if !output.success() {
            debug!(%object, stderr = %output.stderr.trim(), "object not found");
            return Ok(None);
        }
        if output.stdout.trim() != "blob" {
            debug!(%object, kind = %output.stdout.trim(), "not a file");
            return Ok(None);
        }

        let mut blob = self.git();
        blob.args(["cat-file", "blob", &object]);
        let output = self.runner.run_checked(&mut blob, OutputMode::Capture, None)?;
        Ok(Some(output.stdout))
    }
}

impl SourceRepository for GitCli {
    fn clone_into(&self, dest: &Path) -> DeployGateResult<()> {
        let mut cmd = self.session.command(&self.git);
        // Submodules of a server-side repository are usually local paths too.
        cmd.args(["-c", "protocol.file.allow=always"])
            .args(["clone", "--quiet", "--recurse-submodules", "--no-hardlinks"])
            .arg(&self.repository)
            .arg(dest);
        self.runner
            .run_checked(&mut cmd, OutputMode::Capture, self.timeouts.clone)?;
        Ok(())
    }

    fn push(&self, remote_url: &str, refspec: &str) -> DeployGateResult<()> {
        let mut cmd = self.git();
        cmd.env("GIT_SSH_COMMAND", &self.ssh_command)
            .args(["push", "--quiet", remote_url, refspec]);
        self.runner
            .run_checked(&mut cmd, OutputMode::Capture, self.timeouts.push)?;
        Ok(())
    }
}
