//! Outcome Reporting
//!
//! Turns a finished run into its final lines and exit status. Success and
//! skip lines go to stdout; failure banners and captured diagnostics go to
//! stderr. In JSON mode a single `complete` record goes to stdout instead.

use std::io::{self, Write};

use crate::application::deploy::DeployOutcome;
use crate::domain::value_objects::{MirrorState, ProjectId, RemoteStep};
use crate::infrastructure::events::{stamped, MARKER};

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `----->` markers
    #[default]
    Text,
    /// NDJSON records
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub struct Reporter<O: Write, E: Write> {
    format: OutputFormat,
    out: O,
    err: E,
}

impl Reporter<io::Stdout, io::Stderr> {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(format, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(format: OutputFormat, out: O, err: E) -> Self {
        Self { format, out, err }
    }

    /// Print the outcome and return the exit status for it
    pub fn report(&mut self, outcome: &DeployOutcome) -> io::Result<u8> {
        match self.format {
            OutputFormat::Json => self.report_json(outcome)?,
            OutputFormat::Text => self.report_text(outcome)?,
        }
        self.out.flush()?;
        self.err.flush()?;
        Ok(outcome.exit_code())
    }

    fn report_text(&mut self, outcome: &DeployOutcome) -> io::Result<()> {
        match outcome {
            DeployOutcome::Skipped(reason) => {
                writeln!(self.out, "{} Skipping deploy: {}", MARKER, reason)
            }
            DeployOutcome::Deployed {
                project,
                revision,
                host,
                ..
            } => writeln!(
                self.out,
                "{} Deployed {} at {} to {}",
                MARKER,
                project,
                revision.short(),
                host
            ),
            DeployOutcome::SyncFailed { strategy, error } => {
                writeln!(self.err, "{} Sync failed ({}): {}", MARKER, strategy, error)?;
                self.diagnostic(error.diagnostic())
            }
            DeployOutcome::StepFailed { step, error } => {
                let banner = match step {
                    RemoteStep::Checkout => "Checkout failed",
                    RemoteStep::Build => "Build failed",
                    RemoteStep::Deploy => "Deploy failed",
                };
                writeln!(self.err, "{} {}: {}", MARKER, banner, error)?;
                self.diagnostic(error.diagnostic())
            }
        }
    }

    fn diagnostic(&mut self, output: Option<&str>) -> io::Result<()> {
        if let Some(output) = output {
            for line in output.lines() {
                writeln!(self.err, "       {}", line)?;
            }
        }
        Ok(())
    }

    fn report_json(&mut self, outcome: &DeployOutcome) -> io::Result<()> {
        let mut record = serde_json::json!({
            "event": "complete",
            "status": outcome.status(),
            "exit_code": outcome.exit_code(),
        });
        let extra = match outcome {
            DeployOutcome::Skipped(reason) => serde_json::json!({
                "reason": reason.code(),
                "message": reason.to_string(),
            }),
            DeployOutcome::Deployed {
                project,
                revision,
                host,
                strategy,
            } => serde_json::json!({
                "project": project.as_str(),
                "revision": revision.as_str(),
                "host": host,
                "strategy": strategy.as_str(),
            }),
            DeployOutcome::SyncFailed { strategy, error } => serde_json::json!({
                "strategy": strategy.as_str(),
                "error": error.to_string(),
                "diagnostic": error.diagnostic(),
            }),
            DeployOutcome::StepFailed { step, error } => serde_json::json!({
                "step": step.as_str(),
                "error": error.to_string(),
                "diagnostic": error.diagnostic(),
            }),
        };
        if let (Some(record), Some(extra)) = (record.as_object_mut(), extra.as_object()) {
            record.extend(extra.clone());
        }
        writeln!(self.out, "{}", stamped(record))
    }

    /// `mirror status`
    pub fn mirror_status(&mut self, project: &ProjectId, state: MirrorState) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => writeln!(
                self.out,
                "{}",
                stamped(serde_json::json!({
                    "event": "mirror_status",
                    "project": project.as_str(),
                    "state": state.as_str(),
                }))
            )?,
            OutputFormat::Text => writeln!(self.out, "{} {}: {}", MARKER, project, state)?,
        }
        self.out.flush()
    }

    /// `mirror reset`
    pub fn mirror_reset(&mut self, project: &ProjectId, previous: MirrorState) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => writeln!(
                self.out,
                "{}",
                stamped(serde_json::json!({
                    "event": "mirror_reset",
                    "project": project.as_str(),
                    "previous": previous.as_str(),
                }))
            )?,
            OutputFormat::Text if previous == MirrorState::Uninitialized => writeln!(
                self.out,
                "{} {}: nothing to reset",
                MARKER, project
            )?,
            OutputFormat::Text => writeln!(
                self.out,
                "{} {}: reset (was {}), next push bootstraps",
                MARKER, project, previous
            )?,
        }
        self.out.flush()
    }

    /// Error that ended the run before an outcome existed
    pub fn fatal(&mut self, error: &dyn std::fmt::Display, exit_code: u8) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => writeln!(
                self.out,
                "{}",
                stamped(serde_json::json!({
                    "event": "error",
                    "error": error.to_string(),
                    "exit_code": exit_code,
                }))
            )?,
            OutputFormat::Text => writeln!(self.err, "error: {}", error)?,
        }
        self.out.flush()?;
        self.err.flush()
    }
}
