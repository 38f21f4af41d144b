//! Project identifiers
//!
//! A project id is the server-side repository name, possibly nested
//! (`team/service`). It maps to an entry under the staging root, to its
//! bare repository, and to a directory name on the remote host, so it is
//! validated up front.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::DeployGateError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component; names the remote project directory
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Single file name standing for this project under the staging root.
    ///
    /// `%` and `/` are percent-encoded, so `team` and `team/web` get
    /// sibling entries instead of one nesting inside the other.
    pub fn staging_entry(&self) -> String {
        self.0.replace('%', "%25").replace('/', "%2F")
    }

    /// Staging entry for this project, always directly inside `root`
    pub fn staging_path(&self, root: &Path) -> PathBuf {
        root.join(self.staging_entry())
    }

    /// Bare repository under `root`: `team/web` -> `<root>/team/web.git`
    pub fn repository_path(&self, root: &Path) -> PathBuf {
        // `with_extension` would eat dots in the last component.
        let mut path = self
            .0
            .split('/')
            .fold(root.to_path_buf(), |acc, c| acc.join(c))
            .into_os_string();
        path.push(".git");
        PathBuf::from(path)
    }

    /// Derive a project id from a bare repository location
    /// (`/srv/git/team/service.git` with root `/srv/git` -> `team/service`).
    pub fn from_repository(repo: &Path, root: Option<&Path>) -> Result<Self, DeployGateError> {
        let relative = root
            .and_then(|r| repo.strip_prefix(r).ok())
            .filter(|p| !p.as_os_str().is_empty());
        let raw = match relative {
            Some(rel) => rel.to_string_lossy().replace('\\', "/"),
            None => repo
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let trimmed = raw.trim_end_matches('/');
        trimmed.strip_suffix(".git").unwrap_or(trimmed).parse()
    }

    fn invalid(value: &str, reason: &str) -> DeployGateError {
        DeployGateError::InvalidProject {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ProjectId {
    type Err = DeployGateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(Self::invalid(value, "must not be empty"));
        }
        if value.starts_with('/') || value.ends_with('/') {
            return Err(Self::invalid(value, "must be a relative name"));
        }
        for component in value.split('/') {
            match component {
                "" => return Err(Self::invalid(value, "contains an empty path component")),
                "." | ".." => return Err(Self::invalid(value, "contains a relative path component")),
                c if c.starts_with('.') => {
                    return Err(Self::invalid(value, "components must not start with '.'"))
                }
                c if c.chars().any(|ch| ch.is_control() || ch == '\\' || ch == ':') => {
                    return Err(Self::invalid(value, "contains a reserved character"))
                }
                _ => {}
            }
        }
        Ok(Self(value.to_string()))
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
