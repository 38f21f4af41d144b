//! Remote Session
//!
//! The per-run environment shared by every child process of one push: a
//! private HOME and working directory plus an allowlist of inherited
//! variables. The hook host's own `GIT_*` variables and user
//! configuration never reach git, rsync, or ssh.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::DeployGateResult;

#[derive(Debug)]
pub struct RemoteSession {
    home: PathBuf,
    inherited: Vec<(String, OsString)>,
    // Removed when the session is dropped
    _scratch: Option<TempDir>,
}

impl RemoteSession {
    /// Open a session, capturing allowlisted variables now.
    pub fn open(config: &SessionConfig) -> DeployGateResult<Self> {
        Self::open_with(config, |key| std::env::var_os(key))
    }

    /// Like `open`, with an explicit variable lookup (for testing)
    pub fn open_with<F>(config: &SessionConfig, lookup: F) -> DeployGateResult<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let (home, scratch) = match &config.home {
            Some(home) => {
                std::fs::create_dir_all(home)?;
                (home.clone(), None)
            }
            None => {
                let dir = tempfile::Builder::new().prefix("deploygate-").tempdir()?;
                (dir.path().to_path_buf(), Some(dir))
            }
        };

        let inherited = config
            .pass_env
            .iter()
            .filter(|key| key.as_str() != "HOME")
            .filter_map(|key| lookup(key).map(|value| (key.clone(), value)))
            .collect();

        debug!(home = %home.display(), "session opened");

        Ok(Self {
            home,
            inherited,
            _scratch: scratch,
        })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// A `Command` with the session environment and working directory
    pub fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.env_clear()
            .envs(self.inherited.iter().map(|(k, v)| (k, v)))
            .env("HOME", &self.home)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_TERMINAL_PROMPT", "0")
            .current_dir(&self.home);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn env_of(cmd: &Command) -> HashMap<String, Option<String>> {
        cmd.get_envs()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.map(|v| v.to_string_lossy().into_owned()),
                )
            })
            .collect()
    }

    #[test]
    fn scratch_home_is_private_and_cleaned_up() {
        let session = RemoteSession::open_with(&SessionConfig::default(), lookup(&[])).unwrap();
        let home = session.home().to_path_buf();
        assert!(home.is_dir());
        drop(session);
        assert!(!home.exists());
    }

    #[test]
    fn command_only_carries_allowlisted_variables() {
        let session = RemoteSession::open_with(
            &SessionConfig::default(),
            lookup(&[
                ("PATH", "/usr/bin:/bin"),
                ("GIT_DIR", "/srv/git/app.git"),
                ("HOME", "/home/git"),
            ]),
        )
        .unwrap();

        let cmd = session.command("git");
        let env = env_of(&cmd);

        assert_eq!(env["PATH"].as_deref(), Some("/usr/bin:/bin"));
        assert_eq!(
            env["HOME"].as_deref(),
            Some(session.home().to_string_lossy().as_ref())
        );
        assert_eq!(env["GIT_CONFIG_NOSYSTEM"].as_deref(), Some("1"));
        assert!(!env.contains_key("GIT_DIR"));
        assert_eq!(cmd.get_current_dir(), Some(session.home()));
    }

    #[test]
    fn configured_home_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        let config = SessionConfig {
            home: Some(home.clone()),
            pass_env: vec![],
        };

        let session = RemoteSession::open_with(&config, lookup(&[])).unwrap();
        assert_eq!(session.home(), home.as_path());
        drop(session);
        assert!(home.is_dir());
    }
}
