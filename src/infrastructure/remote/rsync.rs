//! Rsync Transfer
//!
//! Copies a bootstrap clone to the remote host with rsync over the
//! configured ssh command line. Archive mode keeps permissions, so `build`
//! and `deploy` stay executable on the other side.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::domain::ports::FileTransfer;
use crate::error::DeployGateResult;
use crate::infrastructure::process::{OutputMode, ProcessRunner};
use crate::infrastructure::session::RemoteSession;

pub struct RsyncTransfer {
    session: Rc<RemoteSession>,
    host: String,
    rsync: String,
    options: Vec<String>,
    /// Passed to `-e`
    ssh_command: String,
    runner: ProcessRunner,
    timeout: Option<Duration>,
}

impl RsyncTransfer {
    pub fn new(
        session: Rc<RemoteSession>,
        host: impl Into<String>,
        rsync: impl Into<String>,
        options: Vec<String>,
        ssh_command: impl Into<String>,
        runner: ProcessRunner,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            session,
            host: host.into(),
            rsync: rsync.into(),
            options,
            ssh_command: ssh_command.into(),
            runner,
            timeout,
        }
    }
}

impl FileTransfer for RsyncTransfer {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn transfer(&self, local_dir: &Path, remote_dir: &str) -> DeployGateResult<()> {
        // Trailing slashes: copy the contents of `local_dir` into `remote_dir`.
        let source = format!("{}/", local_dir.display());
        let dest = format!(
            "{}:{}/",
            self.host,
            remote_dir.trim_end_matches('/')
        );
        debug!(%source, %dest, "rsync transfer");

        let mut cmd = self.session.command(&self.rsync);
        cmd.args(&self.options)
            .arg("-e")
            .arg(&self.ssh_command)
            .arg(&source)
            .arg(&dest);
        self.runner
            .run_checked(&mut cmd, OutputMode::Capture, self.timeout)?;
        Ok(())
    }
}
