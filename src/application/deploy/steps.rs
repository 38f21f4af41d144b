//! Remote Command Runner
//!
//! Checkout, build, deploy, in that order, each only after the previous one
//! succeeded. Output streams straight through to the caller.

use tracing::{error, info};

use crate::domain::entities::PushEvent;
use crate::domain::ports::{DeployEvent, DeployEventSink, RemoteCommand, RemoteShell};
use crate::domain::value_objects::RemoteStep;
use crate::error::DeployGateError;
use crate::infrastructure::shell;

use super::options::DeployOptions;

/// Variables every remote step receives
pub fn step_env(event: &PushEvent, options: &DeployOptions) -> Vec<(String, String)> {
    let mut env = vec![
        ("DEPLOYGATE_PROJECT".to_string(), event.project.to_string()),
        (
            "DEPLOYGATE_REVISION".to_string(),
            event.new_revision.to_string(),
        ),
        (
            "DEPLOYGATE_OLD_REVISION".to_string(),
            event.old_revision.to_string(),
        ),
        ("DEPLOYGATE_REFNAME".to_string(), event.refname.clone()),
    ];
    env.extend(options.remote_env.iter().cloned());
    env
}

/// Shell snippet for `step`, run inside the project directory
pub fn step_script(step: RemoteStep, event: &PushEvent, options: &DeployOptions) -> String {
    match step {
        RemoteStep::Checkout => format!(
            "git checkout -q {} && git log -1 --oneline HEAD",
            event.new_revision
        ),
        RemoteStep::Build => executable(&options.build_file),
        RemoteStep::Deploy => executable(&options.deploy_file),
    }
}

fn executable(path: &str) -> String {
    format!("./{}", shell::quote(path.trim_start_matches("./")))
}

pub fn step_command(
    step: RemoteStep,
    event: &PushEvent,
    remote_dir: &str,
    options: &DeployOptions,
) -> RemoteCommand {
    RemoteCommand {
        step,
        workdir: remote_dir.to_string(),
        script: step_script(step, event, options),
        env: step_env(event, options),
        timeout: options.step_timeouts.for_step(step),
    }
}

/// Run all steps; on failure, the step that failed and why
pub fn run_steps<H>(
    shell: &H,
    event: &PushEvent,
    remote_dir: &str,
    options: &DeployOptions,
    sink: &dyn DeployEventSink,
) -> Result<(), (RemoteStep, DeployGateError)>
where
    H: RemoteShell + ?Sized,
{
    for step in RemoteStep::ALL {
        sink.on_event(DeployEvent::StepStarted { step });
        let command = step_command(step, event, remote_dir, options);
        if let Err(err) = shell.run(&command) {
            error!(%step, error = %err, "remote step failed");
            return Err((step, err));
        }
        info!(%step, "remote step succeeded");
        sink.on_event(DeployEvent::StepCompleted { step });
    }
    Ok(())
}
