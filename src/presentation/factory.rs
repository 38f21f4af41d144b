//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::application::deploy::{DeployOptions, DeployUseCase, StepTimeouts};
use crate::config::{Config, TimeoutConfig};
use crate::domain::value_objects::ProjectId;
use crate::error::{DeployGateError, DeployGateResult};
use crate::infrastructure::{
    ssh_command_line, FsMirrorStateStore, GitCli, GitTimeouts, OutputMode, ProcessRunner,
    RemoteSession, RemoteTimeout, RsyncTransfer, SshShell,
};
use crate::presentation::output::OutputFormat;

/// Type alias for the concrete DeployUseCase with all dependencies
pub type ConcreteDeployUseCase = DeployUseCase<GitCli, FsMirrorStateStore, RsyncTransfer, SshShell>;

/// Where the pushed-to repository lives and what it is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocation {
    pub project: ProjectId,
    pub path: PathBuf,
}

/// Work out the project and its bare repository.
///
/// `git_dir` (the hook's `GIT_DIR`) wins; otherwise the project must be
/// given and the repository is `<repositories_root>/<project>.git`.
pub fn locate_repository(
    config: &Config,
    project: Option<ProjectId>,
    git_dir: Option<PathBuf>,
) -> DeployGateResult<RepositoryLocation> {
    let root = config.paths.repositories_root.as_deref();

    if let Some(git_dir) = git_dir.filter(|p| !p.as_os_str().is_empty()) {
        let path = absolute(&git_dir)?;
        let project = match project {
            Some(project) => project,
            None => ProjectId::from_repository(&path, root)?,
        };
        return Ok(RepositoryLocation { project, path });
    }

    let project = project.ok_or_else(|| DeployGateError::InvalidProject {
        value: String::new(),
        reason: "pass --project or run from a hook that sets GIT_DIR".to_string(),
    })?;
    let root = root.ok_or(DeployGateError::MissingConfig {
        key: "paths.repositories_root",
        env: "DEPLOYGATE_REPOSITORIES_ROOT",
    })?;
    Ok(RepositoryLocation {
        path: project.repository_path(root),
        project,
    })
}

// Hooks in bare repositories run with `GIT_DIR=.`; collecting the
// components drops the trailing `.`.
fn absolute(path: &Path) -> DeployGateResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(joined.components().collect())
}

pub fn create_runner(config: &Config) -> ProcessRunner {
    ProcessRunner::new(config.timeouts.kill_grace())
}

pub fn create_session(config: &Config) -> DeployGateResult<Rc<RemoteSession>> {
    RemoteSession::open(&config.session).map(Rc::new)
}

pub fn create_state_store(config: &Config) -> DeployGateResult<FsMirrorStateStore> {
    config.staging_root().map(FsMirrorStateStore::new)
}

/// Git adapter for the hook's repository; needs no remote host
pub fn create_repository(
    config: &Config,
    repository: &Path,
    session: Rc<RemoteSession>,
) -> GitCli {
    GitCli::new(
        &config.git.command,
        repository,
        ssh_command_line(&config.remote.ssh_command, &config.remote.ssh_options),
        session,
        create_runner(config),
        GitTimeouts {
            clone: TimeoutConfig::limit(config.timeouts.clone),
            push: TimeoutConfig::limit(config.timeouts.push),
        },
    )
}

pub fn create_deploy_options(config: &Config) -> DeployOptions {
    DeployOptions {
        target_branch: config.gate.target_branch.clone(),
        build_file: config.gate.build_file.clone(),
        deploy_file: config.gate.deploy_file.clone(),
        remote_root: config.remote.root.clone(),
        remote_env: config
            .remote
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        step_timeouts: StepTimeouts {
            checkout: TimeoutConfig::limit(config.timeouts.checkout),
            build: TimeoutConfig::limit(config.timeouts.build),
            deploy: TimeoutConfig::limit(config.timeouts.deploy),
        },
    }
}

/// Remote shell for build and deploy.
///
/// In JSON mode streamed step output goes to stderr so stdout stays NDJSON.
pub fn create_remote_shell(
    config: &Config,
    host: String,
    session: Rc<RemoteSession>,
    format: OutputFormat,
) -> SshShell {
    let mut shell = SshShell::new(
        session,
        host,
        &config.remote.ssh_command,
        config.remote.ssh_options.clone(),
        create_runner(config),
    )
    .with_output(match format {
        OutputFormat::Json => OutputMode::StreamToStderr,
        OutputFormat::Text => OutputMode::Stream,
    });
    if !config.remote.timeout_command.is_empty() {
        shell = shell.with_remote_timeout(RemoteTimeout {
            command: config.remote.timeout_command.clone(),
            kill_grace: config.timeouts.kill_grace(),
        });
    }
    shell
}

/// Create a deploy use case around an already opened repository.
///
/// Fails when the remote host or staging root cannot be resolved.
pub fn create_deploy_use_case(
    config: &Config,
    repo: GitCli,
    session: Rc<RemoteSession>,
    format: OutputFormat,
) -> DeployGateResult<ConcreteDeployUseCase> {
    let host = config.remote_host()?.to_string();
    let store = create_state_store(config)?;
    let runner = create_runner(config);

    let shell = create_remote_shell(config, host.clone(), Rc::clone(&session), format);
    let transfer = RsyncTransfer::new(
        session,
        host,
        &config.remote.rsync_command,
        config.remote.rsync_options.clone(),
        shell.ssh_command_line(),
        runner,
        TimeoutConfig::limit(config.timeouts.transfer),
    );

    Ok(DeployUseCase::new(
        repo,
        store,
        transfer,
        shell,
        create_deploy_options(config),
    ))
}
