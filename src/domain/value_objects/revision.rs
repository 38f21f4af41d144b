//! Revision identifiers
//!
//! Full hex object ids as handed to the hook by the git server.

use std::fmt;
use std::str::FromStr;

use crate::error::DeployGateError;

/// A full object id (SHA-1 or SHA-256), stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The all-zero id marks a created or deleted ref
    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    /// Abbreviated form for progress lines
    pub fn short(&self) -> &str {
        &self.0[..10]
    }
}

impl FromStr for RevisionId {
    type Err = DeployGateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let valid_len = trimmed.len() == 40 || trimmed.len() == 64;
        if !valid_len || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DeployGateError::InvalidRevision {
                value: value.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
