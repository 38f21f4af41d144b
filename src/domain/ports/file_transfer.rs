//! File Transfer Port
//!
//! Copies a local directory tree to the remote host.

use std::path::Path;

use crate::error::DeployGateResult;

pub trait FileTransfer {
    /// Name of the transfer method (for logging)
    fn name(&self) -> &'static str;

    /// Copy the contents of `local_dir` into `remote_dir` on the remote host.
    ///
    /// Must preserve the tree structure and only send changed data, so that
    /// repeating a transfer with no local changes moves no file contents.
    fn transfer(&self, local_dir: &Path, remote_dir: &str) -> DeployGateResult<()>;
}
