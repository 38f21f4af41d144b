//! Error types for deploygate
//!
//! Library code returns `DeployGateError`; the binary wraps it in `anyhow`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for deploygate operations
pub type DeployGateResult<T> = Result<T, DeployGateError>;

/// Main error type for deploygate operations
#[derive(Error, Debug)]
pub enum DeployGateError {
    /// Revision is not a full hex object id
    #[error("invalid revision '{value}': expected a full 40 or 64 character hex object id")]
    InvalidRevision { value: String },

    /// Project identifier cannot be mapped under the staging root
    #[error("invalid project identifier '{value}': {reason}")]
    InvalidProject { value: String, reason: String },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// A required setting is absent from config and environment
    #[error("missing configuration: {key} (set it in the config file or via {env})")]
    MissingConfig { key: &'static str, env: &'static str },

    /// Could not start a child process
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Child process exited unsuccessfully
    #[error("{program} exited with {}", describe_status(.code))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        output: String,
    },

    /// Child process exceeded its time budget and was terminated
    #[error("{program} timed out after {}s and was terminated", .after.as_secs())]
    TimedOut { program: String, after: Duration },

    /// Mirror state marker could not be read or written
    #[error("mirror state error at {path}: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployGateError {
    /// Captured output attached to a failed command, if any
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { output, .. } if !output.trim().is_empty() => Some(output),
            _ => None,
        }
    }

    /// Process exit status for an error that ends the run: 2 for bad input
    /// or configuration, 1 for everything else
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidRevision { .. }
            | Self::InvalidProject { .. }
            | Self::InvalidConfig { .. }
            | Self::MissingConfig { .. } => 2,
            _ => 1,
        }
    }

    pub(crate) fn state(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::State {
            path: path.into(),
            source,
        }
    }
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_revision() {
        let err = DeployGateError::InvalidRevision {
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid revision 'abc': expected a full 40 or 64 character hex object id"
        );
    }

    #[test]
    fn test_error_display_command_failed() {
        let err = DeployGateError::CommandFailed {
            program: "rsync".to_string(),
            code: Some(23),
            output: "partial transfer".to_string(),
        };
        assert_eq!(err.to_string(), "rsync exited with status 23");
        assert_eq!(err.diagnostic(), Some("partial transfer"));
    }

    #[test]
    fn test_error_display_signal() {
        let err = DeployGateError::CommandFailed {
            program: "ssh".to_string(),
            code: None,
            output: "   ".to_string(),
        };
        assert_eq!(err.to_string(), "ssh exited with no status (killed by signal)");
        assert_eq!(err.diagnostic(), None);
    }

    #[test]
    fn test_error_display_timeout() {
        let err = DeployGateError::TimedOut {
            program: "ssh".to_string(),
            after: Duration::from_secs(90),
        };
        assert_eq!(err.to_string(), "ssh timed out after 90s and was terminated");
    }

    #[test]
    fn test_exit_code_separates_usage_from_runtime_errors() {
        let missing = DeployGateError::MissingConfig {
            key: "remote.host",
            env: "DEPLOYGATE_REMOTE_HOST",
        };
        assert_eq!(missing.exit_code(), 2);
        let io = DeployGateError::Io(std::io::Error::other("boom"));
        assert_eq!(io.exit_code(), 1);
    }
}
