//! Console Event Sink
//!
//! Prints `----->` progress markers, flushing after each line so they
//! interleave correctly with the streamed output of remote steps.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeployEventSink};
use crate::domain::value_objects::{RemoteStep, SyncStrategy};

pub const MARKER: &str = "----->";

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn line(&self, message: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{} {}", MARKER, message);
            let _ = writer.flush();
        }
    }
}

fn short(revision: &str) -> &str {
    revision.get(..10).unwrap_or(revision)
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let message = match event {
            DeployEvent::Started {
                project,
                revision,
                host,
            } => format!("Deploying {} at {} to {}", project, short(&revision), host),
            DeployEvent::StrategyChosen {
                strategy: SyncStrategy::Bootstrap,
                ..
            } => "No remote mirror yet, bootstrapping".to_string(),
            DeployEvent::StrategyChosen { .. } => return,
            DeployEvent::RecoveringInterrupted { path } => format!(
                "Removing leftovers of an interrupted bootstrap ({})",
                path.display()
            ),
            DeployEvent::Cloning { path } => format!("Cloning into {}", path.display()),
            DeployEvent::Transferring { method, remote_dir } => {
                format!("Copying clone to {} via {}", remote_dir, method)
            }
            DeployEvent::MirrorInitialized { .. } => "Remote mirror initialized".to_string(),
            DeployEvent::Pushing { revision, .. } => {
                format!("Pushing {} to remote mirror", short(&revision))
            }
            DeployEvent::StepStarted { step } => match step {
                RemoteStep::Checkout => "Checking out".to_string(),
                RemoteStep::Build => "Building".to_string(),
                RemoteStep::Deploy => "Deploying".to_string(),
            },
            DeployEvent::StepCompleted { .. } => return,
        };
        self.line(message);
    }
}
