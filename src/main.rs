//! deploygate CLI - post-receive deployment gate
//!
//! Usage:
//!   deploygate --refname <REF> --uploader <WHO> --oldrev <REV> --newrev <REV> [--project <P>]
//!   deploygate mirror status --project <P>
//!   deploygate mirror reset --project <P>

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deploygate::application::deploy::{evaluate_gate, evaluate_ref, DeployOutcome};
use deploygate::application::mirror::MirrorUseCase;
use deploygate::config::{self, Config};
use deploygate::domain::ports::DeployEventSink;
use deploygate::domain::services::GateDecision;
use deploygate::infrastructure::{ConsoleEventSink, JsonEventSink};
use deploygate::presentation::factory::{
    create_deploy_options, create_deploy_use_case, create_repository, create_session,
    create_state_store, locate_repository,
};
use deploygate::presentation::{Cli, Commands, HookArgs, MirrorAction, OutputFormat, Reporter};
use deploygate::{DeployGateError, PushEvent};

/// Overrides the `-v` derived log filter
const LOG_ENV: &str = "DEPLOYGATE_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = OutputFormat::from_flag(cli.json);
    match run(cli, format) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let code = err
                .downcast_ref::<DeployGateError>()
                .map(DeployGateError::exit_code)
                .unwrap_or(1);
            let _ = Reporter::stdio(format).fatal(&format!("{:#}", err), code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries markers and NDJSON; logs stay on stderr.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn run(cli: Cli, format: OutputFormat) -> Result<u8> {
    let loaded = config::load(cli.config.as_deref())?;
    if let Some(source) = &loaded.source {
        debug!(config = %source.display(), "configuration loaded");
    }
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }
    let config = loaded.config;

    match cli.command {
        Some(Commands::Mirror { action }) => run_mirror(&config, action, format),
        None => run_hook(&config, cli.hook, format),
    }
}

fn run_mirror(config: &Config, action: MirrorAction, format: OutputFormat) -> Result<u8> {
    let store = create_state_store(config)?;
    debug!(staging_root = %store.root().display(), "mirror maintenance");
    let mirror = MirrorUseCase::new(store);
    let mut reporter = Reporter::stdio(format);

    match action {
        MirrorAction::Status { project } => {
            let state = mirror.status(&project)?;
            reporter.mirror_status(&project, state)?;
        }
        MirrorAction::Reset { project } => {
            let previous = mirror
                .reset(&project)
                .with_context(|| format!("resetting mirror state of {}", project))?;
            reporter.mirror_reset(&project, previous)?;
        }
    }
    Ok(0)
}

fn run_hook(config: &Config, hook: HookArgs, format: OutputFormat) -> Result<u8> {
    // clap enforces these outside of subcommands.
    let refname = hook.refname.ok_or_else(|| anyhow!("--refname is required"))?;
    let uploader = hook.uploader.ok_or_else(|| anyhow!("--uploader is required"))?;
    let old_revision = hook.oldrev.ok_or_else(|| anyhow!("--oldrev is required"))?;
    let new_revision = hook.newrev.ok_or_else(|| anyhow!("--newrev is required"))?;

    // Other branches and deletions skip before anything can fail on a
    // missing repository or session.
    let mut reporter = Reporter::stdio(format);
    let options = create_deploy_options(config);
    if let GateDecision::Skip(reason) = evaluate_ref(&options, &refname, &new_revision) {
        return Ok(reporter.report(&DeployOutcome::Skipped(reason))?);
    }

    let location = locate_repository(
        config,
        hook.project,
        std::env::var_os("GIT_DIR").map(PathBuf::from),
    )?;
    debug!(project = %location.project, repository = %location.path.display(), "hook invoked");

    let session = create_session(config)?;
    let repo = create_repository(config, &location.path, session.clone());
    let event = PushEvent::new(
        location.project,
        refname,
        uploader,
        old_revision,
        new_revision,
    );

    if let GateDecision::Skip(reason) = evaluate_gate(&options, &event, &repo) {
        return Ok(reporter.report(&DeployOutcome::Skipped(reason))?);
    }

    let use_case = create_deploy_use_case(config, repo, session, format)?;
    let sink: Box<dyn DeployEventSink> = match format {
        OutputFormat::Json => Box::new(JsonEventSink::stdout()),
        OutputFormat::Text => Box::new(ConsoleEventSink::stdout()),
    };
    let outcome = use_case.deploy(&event, sink.as_ref());
    Ok(reporter.report(&outcome)?)
}
