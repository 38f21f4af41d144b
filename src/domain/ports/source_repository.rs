//! Source Repository Port
//!
//! The local bare repository the hook fired for.

use std::path::Path;

use crate::domain::value_objects::RevisionId;
use crate::error::DeployGateResult;

/// Read-only content lookups at a revision
pub trait RevisionReader {
    /// Contents of `path` at `revision`, decoded lossily as UTF-8.
    ///
    /// `Ok(None)` when the path does not exist there or is not a file.
    fn read_file(&self, revision: &RevisionId, path: &str) -> DeployGateResult<Option<String>>;
}

/// Operations the sync executor needs on top of reads
pub trait SourceRepository: RevisionReader {
    /// Full working clone (submodules included) at `dest`, which must not exist
    fn clone_into(&self, dest: &Path) -> DeployGateResult<()>;

    /// Push `refspec` to `remote_url` over the remote shell
    fn push(&self, remote_url: &str, refspec: &str) -> DeployGateResult<()>;
}
