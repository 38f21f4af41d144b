//! Configuration module for deploygate
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (DEPLOYGATE_*)
//! 3. Config file (--config, DEPLOYGATE_CONFIG, or ~/.config/deploygate/config.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    load, with_env_overrides, with_overrides_from, ConfigWarning, LoadedConfig, CONFIG_ENV,
};
pub use types::{
    Config, GateConfig, GitConfig, PathsConfig, RemoteConfig, SessionConfig, TimeoutConfig,
};
