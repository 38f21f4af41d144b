//! Configuration type definitions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeployGateError, DeployGateResult};

use super::loader::{self, ConfigWarning};

/// Which pushes are deployed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_target_branch")]
    pub target_branch: String,

    #[serde(default = "default_build_file")]
    pub build_file: String,

    #[serde(default = "default_deploy_file")]
    pub deploy_file: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            target_branch: default_target_branch(),
            build_file: default_build_file(),
            deploy_file: default_deploy_file(),
        }
    }
}

fn default_target_branch() -> String {
    "master".to_string()
}

fn default_build_file() -> String {
    "build".to_string()
}

fn default_deploy_file() -> String {
    "deploy".to_string()
}

/// Local filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Holds one mirror-state entry per project
    #[serde(default)]
    pub staging_root: Option<PathBuf>,

    /// Where bare repositories live when `GIT_DIR` is not set
    #[serde(default)]
    pub repositories_root: Option<PathBuf>,
}

/// Remote execution host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// `host` or `user@host`
    #[serde(default)]
    pub host: Option<String>,

    /// Parent directory for project clones, relative to the login directory
    #[serde(default)]
    pub root: Option<String>,

    #[serde(default = "default_ssh_command")]
    pub ssh_command: String,

    #[serde(default = "default_ssh_options")]
    pub ssh_options: Vec<String>,

    #[serde(default = "default_rsync_command")]
    pub rsync_command: String,

    #[serde(default = "default_rsync_options")]
    pub rsync_options: Vec<String>,

    /// Remote `timeout(1)` that bounds build and deploy on the host itself;
    /// empty leaves remote steps unwrapped
    #[serde(default = "default_timeout_command")]
    pub timeout_command: String,

    /// Extra variables exported for build and deploy
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: None,
            root: None,
            ssh_command: default_ssh_command(),
            ssh_options: default_ssh_options(),
            rsync_command: default_rsync_command(),
            rsync_options: default_rsync_options(),
            timeout_command: default_timeout_command(),
            env: BTreeMap::new(),
        }
    }
}

fn default_ssh_command() -> String {
    "ssh".to_string()
}

// Non-interactive: never prompt, and notice dead connections.
fn default_ssh_options() -> Vec<String> {
    [
        "BatchMode=yes",
        "ConnectTimeout=10",
        "ServerAliveInterval=15",
        "ServerAliveCountMax=3",
    ]
    .iter()
    .flat_map(|opt| ["-o".to_string(), opt.to_string()])
    .collect()
}

fn default_timeout_command() -> String {
    "timeout".to_string()
}

fn default_rsync_command() -> String {
    "rsync".to_string()
}

fn default_rsync_options() -> Vec<String> {
    vec!["--archive".to_string(), "--compress".to_string()]
}

/// Local git binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_git_command")]
    pub command: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            command: default_git_command(),
        }
    }
}

fn default_git_command() -> String {
    "git".to_string()
}

/// Environment handed to every child process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed HOME for child processes; a fresh temp dir per run when unset
    #[serde(default)]
    pub home: Option<PathBuf>,

    /// Variables inherited from the hook environment; everything else is dropped
    #[serde(default = "default_pass_env")]
    pub pass_env: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            home: None,
            pass_env: default_pass_env(),
        }
    }
}

fn default_pass_env() -> Vec<String> {
    ["PATH", "LANG", "LC_ALL", "TZ", "SSH_AUTH_SOCK"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Per-step time budgets in seconds; 0 disables the limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_clone_timeout")]
    pub clone: u64,

    #[serde(default = "default_transfer_timeout")]
    pub transfer: u64,

    #[serde(default = "default_push_timeout")]
    pub push: u64,

    #[serde(default = "default_checkout_timeout")]
    pub checkout: u64,

    #[serde(default = "default_build_timeout")]
    pub build: u64,

    #[serde(default = "default_deploy_timeout")]
    pub deploy: u64,

    /// Wait between SIGTERM and SIGKILL
    #[serde(default = "default_kill_grace")]
    pub kill_grace: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            clone: default_clone_timeout(),
            transfer: default_transfer_timeout(),
            push: default_push_timeout(),
            checkout: default_checkout_timeout(),
            build: default_build_timeout(),
            deploy: default_deploy_timeout(),
            kill_grace: default_kill_grace(),
        }
    }
}

fn default_clone_timeout() -> u64 {
    600
}

fn default_transfer_timeout() -> u64 {
    1800
}

fn default_push_timeout() -> u64 {
    600
}

fn default_checkout_timeout() -> u64 {
    300
}

fn default_build_timeout() -> u64 {
    3600
}

fn default_deploy_timeout() -> u64 {
    1800
}

fn default_kill_grace() -> u64 {
    10
}

impl TimeoutConfig {
    /// `None` when the configured value is 0
    pub fn limit(secs: u64) -> Option<Duration> {
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> DeployGateResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load configuration and collect unknown-key warnings
    pub fn load_with_warnings(path: &Path) -> DeployGateResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Configured staging root, else the per-user data directory
    pub fn staging_root(&self) -> DeployGateResult<PathBuf> {
        self.paths
            .staging_root
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("deploygate").join("staging")))
            .ok_or(DeployGateError::MissingConfig {
                key: "paths.staging_root",
                env: "DEPLOYGATE_STAGING_ROOT",
            })
    }

    pub fn remote_host(&self) -> DeployGateResult<&str> {
        self.remote
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or(DeployGateError::MissingConfig {
                key: "remote.host",
                env: "DEPLOYGATE_REMOTE_HOST",
            })
    }
}
