//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeployGateError, DeployGateResult};

use super::types::Config;

/// Explicit config path
pub const CONFIG_ENV: &str = "DEPLOYGATE_CONFIG";

/// Non-fatal configuration warning surfaced to operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> DeployGateResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| DeployGateError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| DeployGateError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                key: path_str,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Where the configuration came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Resolve and load configuration, then apply environment overrides.
///
/// Order: explicit path, `DEPLOYGATE_CONFIG`, the user config file, defaults.
/// An explicitly named file must exist; the user config file is optional.
pub fn load(explicit: Option<&Path>) -> DeployGateResult<LoadedConfig> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let source = match named {
        Some(path) => Some(path),
        None => dirs::config_dir()
            .map(|dir| dir.join("deploygate").join("config.toml"))
            .filter(|path| path.is_file()),
    };

    let (config, warnings) = match &source {
        Some(path) => load_with_warnings(path)?,
        None => (Config::default(), Vec::new()),
    };

    Ok(LoadedConfig {
        config: with_env_overrides(config),
        source,
        warnings,
    })
}

/// Apply environment variable overrides (DEPLOYGATE_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary lookup (for testing)
pub fn with_overrides_from<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = lookup("DEPLOYGATE_REMOTE_HOST") {
        config.remote.host = Some(host);
    }

    if let Some(root) = lookup("DEPLOYGATE_STAGING_ROOT") {
        config.paths.staging_root = Some(PathBuf::from(root));
    }

    if let Some(root) = lookup("DEPLOYGATE_REPOSITORIES_ROOT") {
        config.paths.repositories_root = Some(PathBuf::from(root));
    }

    if let Some(branch) = lookup("DEPLOYGATE_TARGET_BRANCH") {
        config.gate.target_branch = branch;
    }

    if let Some(ssh) = lookup("DEPLOYGATE_SSH_COMMAND") {
        config.remote.ssh_command = ssh;
    }

    if let Some(rsync) = lookup("DEPLOYGATE_RSYNC_COMMAND") {
        config.remote.rsync_command = rsync;
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "gate",
        "target_branch",
        "build_file",
        "deploy_file",
        "paths",
        "staging_root",
        "repositories_root",
        "remote",
        "host",
        "root",
        "ssh_command",
        "ssh_options",
        "rsync_command",
        "rsync_options",
        "env",
        "git",
        "command",
        "session",
        "home",
        "pass_env",
        "timeouts",
        "clone",
        "transfer",
        "push",
        "checkout",
        "build",
        "deploy",
        "kill_grace",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
