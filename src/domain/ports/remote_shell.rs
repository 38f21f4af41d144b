//! Remote Shell Port
//!
//! Runs commands on the remote execution host.

use std::time::Duration;

use crate::domain::value_objects::RemoteStep;
use crate::error::DeployGateResult;

/// One command to run remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub step: RemoteStep,
    /// Directory to `cd` into, relative to the remote login directory
    pub workdir: String,
    /// Shell snippet run inside `workdir`
    pub script: String,
    /// Variables exported before `script` runs
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

pub trait RemoteShell {
    /// Host identity, as used in progress lines
    fn host(&self) -> &str;

    /// Address of `dir` on the remote host in a form `git push` accepts
    fn repository_url(&self, dir: &str) -> String;

    /// Run `command`, streaming its output. Non-zero exit is an error.
    fn run(&self, command: &RemoteCommand) -> DeployGateResult<()>;
}
