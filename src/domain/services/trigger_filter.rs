//! Trigger Filter
//!
//! Decides whether a ref update should be deployed at all. A skip is an
//! expected outcome, not an error.

use std::fmt;

use tracing::{debug, warn};

use crate::domain::ports::RevisionReader;
use crate::domain::value_objects::RevisionId;

/// Why a push was not deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotTargetBranch { target: String },
    RefDeleted,
    MissingBuildFile { name: String },
    MissingDeployFile { name: String },
}

impl SkipReason {
    /// Stable identifier for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::NotTargetBranch { .. } => "not_target_branch",
            SkipReason::RefDeleted => "ref_deleted",
            SkipReason::MissingBuildFile { .. } => "no_build_file",
            SkipReason::MissingDeployFile { .. } => "no_deploy_file",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotTargetBranch { target } => {
                write!(f, "not pushed to target branch ({})", target)
            }
            SkipReason::RefDeleted => write!(f, "ref deleted, nothing to deploy"),
            SkipReason::MissingBuildFile { name } if name == "build" => {
                write!(f, "no build file found")
            }
            SkipReason::MissingBuildFile { name } => write!(f, "no build file found ({})", name),
            SkipReason::MissingDeployFile { name } if name == "deploy" => {
                write!(f, "no deploy file found")
            }
            SkipReason::MissingDeployFile { name } => {
                write!(f, "no deploy file found ({})", name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Skip(SkipReason),
}

/// Branch and marker-file rules for one deployment target
#[derive(Debug, Clone)]
pub struct TriggerFilter {
    target_ref: String,
    target_branch: String,
    build_file: String,
    deploy_file: String,
}

impl TriggerFilter {
    pub fn new(
        target_branch: impl Into<String>,
        build_file: impl Into<String>,
        deploy_file: impl Into<String>,
    ) -> Self {
        let target_branch = target_branch.into();
        Self {
            target_ref: format!("refs/heads/{}", target_branch),
            target_branch,
            build_file: build_file.into(),
            deploy_file: deploy_file.into(),
        }
    }

    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    /// Apply the rules in order; the first failing rule decides.
    pub fn evaluate<R>(&self, refname: &str, new_revision: &RevisionId, repo: &R) -> GateDecision
    where
        R: RevisionReader + ?Sized,
    {
        if let Some(reason) = self.check_ref(refname, new_revision) {
            return GateDecision::Skip(reason);
        }

        if !has_file(repo, new_revision, &self.build_file) {
            return GateDecision::Skip(SkipReason::MissingBuildFile {
                name: self.build_file.clone(),
            });
        }

        if !has_file(repo, new_revision, &self.deploy_file) {
            return GateDecision::Skip(SkipReason::MissingDeployFile {
                name: self.deploy_file.clone(),
            });
        }

        GateDecision::Proceed
    }
}

impl TriggerFilter {
    /// The rules that need no repository: target branch, then deletion
    pub fn check_ref(&self, refname: &str, new_revision: &RevisionId) -> Option<SkipReason> {
        if refname != self.target_ref {
            return Some(SkipReason::NotTargetBranch {
                target: self.target_branch.clone(),
            });
        }
        if new_revision.is_zero() {
            return Some(SkipReason::RefDeleted);
        }
        None
    }
}

impl Default for TriggerFilter {
    fn default() -> Self {
        Self::new("master", "build", "deploy")
    }
}

// Unreadable counts as absent.
fn has_file<R>(repo: &R, revision: &RevisionId, path: &str) -> bool
where
    R: RevisionReader + ?Sized,
{
    match repo.read_file(revision, path) {
        Ok(Some(_)) => true,
        Ok(None) => {
            debug!(%revision, path, "file absent at revision");
            false
        }
        Err(err) => {
            warn!(%revision, path, error = %err, "could not read file at revision");
            false
        }
    }
}
