//! Deploy Options
//!
//! Settings for one gate run, already resolved from configuration.

use std::time::Duration;

use crate::domain::services::TriggerFilter;
use crate::domain::value_objects::{ProjectId, RemoteStep};

/// Time limits for the remote steps; `None` means unbounded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepTimeouts {
    pub checkout: Option<Duration>,
    pub build: Option<Duration>,
    pub deploy: Option<Duration>,
}

impl StepTimeouts {
    pub fn for_step(&self, step: RemoteStep) -> Option<Duration> {
        match step {
            RemoteStep::Checkout => self.checkout,
            RemoteStep::Build => self.build,
            RemoteStep::Deploy => self.deploy,
        }
    }
}

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Branch whose pushes deploy (`master`)
    pub target_branch: String,
    /// File that must exist at the new revision (`build`)
    pub build_file: String,
    /// File that must exist at the new revision (`deploy`)
    pub deploy_file: String,
    /// Parent directory of project checkouts on the remote host
    pub remote_root: Option<String>,
    /// Extra variables exported to every remote step
    pub remote_env: Vec<(String, String)>,
    pub step_timeouts: StepTimeouts,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            target_branch: "master".to_string(),
            build_file: "build".to_string(),
            deploy_file: "deploy".to_string(),
            remote_root: None,
            remote_env: Vec::new(),
            step_timeouts: StepTimeouts::default(),
        }
    }
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = branch.into();
        self
    }

    pub fn with_remote_root(mut self, root: impl Into<String>) -> Self {
        self.remote_root = Some(root.into());
        self
    }

    pub fn with_remote_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.remote_env.push((key.into(), value.into()));
        self
    }

    pub fn with_step_timeouts(mut self, timeouts: StepTimeouts) -> Self {
        self.step_timeouts = timeouts;
        self
    }

    pub fn filter(&self) -> TriggerFilter {
        TriggerFilter::new(&self.target_branch, &self.build_file, &self.deploy_file)
    }

    /// Project directory on the remote host, relative to the login directory
    /// unless the root is absolute
    pub fn remote_dir(&self, project: &ProjectId) -> String {
        match self
            .remote_root
            .as_deref()
            .map(|r| r.trim_end_matches('/'))
            .filter(|r| !r.is_empty())
        {
            Some(root) => format!("{}/{}", root, project.base_name()),
            None => project.base_name().to_string(),
        }
    }
}
