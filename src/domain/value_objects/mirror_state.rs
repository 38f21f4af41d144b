//! Mirror state
//!
//! Whether the remote host already holds a clone of the project. The
//! on-disk encoding lives in `infrastructure::state`; this type is what
//! the rest of the crate reasons about.

use std::fmt;

/// Per-project mirror state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    /// Nothing at the staging path
    Uninitialized,
    /// A staging directory survived a crashed bootstrap
    Interrupted,
    /// Zero-length marker present: the remote clone exists
    Bootstrapped,
}

/// How the remote repository gets brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Full local clone, rsync to the host, then write the marker
    Bootstrap,
    /// `git push` of the new revision to the existing remote clone
    Incremental,
}

impl MirrorState {
    /// An interrupted bootstrap is never trusted; it is redone.
    pub fn strategy(self) -> SyncStrategy {
        match self {
            MirrorState::Bootstrapped => SyncStrategy::Incremental,
            MirrorState::Uninitialized | MirrorState::Interrupted => SyncStrategy::Bootstrap,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MirrorState::Uninitialized => "uninitialized",
            MirrorState::Interrupted => "interrupted",
            MirrorState::Bootstrapped => "bootstrapped",
        }
    }
}

impl fmt::Display for MirrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStrategy::Bootstrap => "bootstrap",
            SyncStrategy::Incremental => "incremental",
        }
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
