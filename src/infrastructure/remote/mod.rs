//! Remote Host Access
//!
//! `SshShell` runs the remote steps; `RsyncTransfer` copies the bootstrap
//! clone. Both reach the host through the same ssh command line, so host
//! keys, batch mode, and keepalives behave identically for every channel.

mod rsync;

pub use rsync::RsyncTransfer;

use std::rc::Rc;
use std::time::Duration;

use tracing::{info, warn};

use super::process::{OutputMode, ProcessRunner};
use super::session::RemoteSession;
use super::shell;
use crate::domain::ports::{RemoteCommand, RemoteShell};
use crate::error::DeployGateResult;

/// The ssh program and options as one shell word list, for
/// `GIT_SSH_COMMAND` and `rsync -e`
pub fn ssh_command_line(ssh: &str, options: &[String]) -> String {
    shell::join(std::iter::once(ssh).chain(options.iter().map(String::as_str)))
}

/// Remote `timeout(1)` invocation that bounds a step on the host.
///
/// Without a pty, killing the local ssh client sends the remote shell no
/// hangup. `timeout` puts the step in its own process group and signals
/// the whole group on expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTimeout {
    pub command: String,
    pub kill_grace: Duration,
}

impl RemoteTimeout {
    /// `exec timeout [-k <grace>] <secs> sh -c '<script>'`
    pub fn wrap(&self, script: &str, limit: Duration) -> String {
        let mut words = vec!["exec".to_string(), shell::quote(&self.command)];
        if !self.kill_grace.is_zero() {
            words.push("-k".to_string());
            words.push(self.kill_grace.as_secs().max(1).to_string());
        }
        words.push(limit.as_secs().max(1).to_string());
        words.push("sh -c".to_string());
        words.push(shell::quote(script));
        words.join(" ")
    }
}

pub struct SshShell {
    session: Rc<RemoteSession>,
    host: String,
    ssh: String,
    options: Vec<String>,
    runner: ProcessRunner,
    remote_timeout: Option<RemoteTimeout>,
    output: OutputMode,
}

impl SshShell {
    pub fn new(
        session: Rc<RemoteSession>,
        host: impl Into<String>,
        ssh: impl Into<String>,
        options: Vec<String>,
        runner: ProcessRunner,
    ) -> Self {
        Self {
            session,
            host: host.into(),
            ssh: ssh.into(),
            options,
            runner,
            remote_timeout: None,
            output: OutputMode::Stream,
        }
    }

    /// Bound timed steps on the remote host too
    pub fn with_remote_timeout(mut self, remote_timeout: RemoteTimeout) -> Self {
        self.remote_timeout = Some(remote_timeout);
        self
    }

    /// Where streamed step output goes locally
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn ssh_command_line(&self) -> String {
        ssh_command_line(&self.ssh, &self.options)
    }

    /// Script handed to the remote shell for `command`, with the step's
    /// time limit applied remotely when one is configured
    pub fn remote_script(&self, command: &RemoteCommand) -> String {
        match (&self.remote_timeout, command.timeout) {
            (Some(remote), Some(limit)) => {
                Self::render_script(command, &remote.wrap(&command.script, limit))
            }
            _ => Self::render(command),
        }
    }

    /// `cd` into the workdir, export the variables, then run the script
    pub fn render(command: &RemoteCommand) -> String {
        Self::render_script(command, &command.script)
    }

    fn render_script(command: &RemoteCommand, script: &str) -> String {
        let mut parts = vec![format!("cd {}", shell::quote_path(&command.workdir))];
        for (key, value) in &command.env {
            if !shell::is_env_name(key) {
                warn!(key = %key, "skipping remote variable with invalid name");
                continue;
            }
            parts.push(format!("export {}={}", key, shell::quote(value)));
        }
        parts.push(script.to_string());
        parts.join(" && ")
    }
}

impl RemoteShell for SshShell {
    fn host(&self) -> &str {
        &self.host
    }

    fn repository_url(&self, dir: &str) -> String {
        format!("{}:{}", self.host, dir)
    }

    fn run(&self, command: &RemoteCommand) -> DeployGateResult<()> {
        let script = self.remote_script(command);
        info!(step = %command.step, host = %self.host(), "running remote step");

        let mut cmd = self.session.command(&self.ssh);
        cmd.args(&self.options).arg(&self.host).arg(&script);
        self.runner
            .run_checked(&mut cmd, self.output, command.timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::domain::value_objects::RemoteStep;

    fn command(env: Vec<(&str, &str)>) -> RemoteCommand {
        RemoteCommand {
            step: RemoteStep::Build,
            workdir: "apps/web".to_string(),
            script: "./build".to_string(),
            env: env
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timeout: None,
        }
    }

    #[test]
    fn render_changes_directory_and_exports() {
        let script = SshShell::render(&command(vec![
            ("DEPLOYGATE_PROJECT", "web"),
            ("GREETING", "hello world"),
        ]));
        assert_eq!(
            script,
            "cd apps/web && export DEPLOYGATE_PROJECT=web && export GREETING='hello world' && ./build"
        );
    }

    #[test]
    fn render_drops_unusable_variable_names() {
        let script = SshShell::render(&command(vec![("BAD-NAME", "x"), ("OK", "1")]));
        assert_eq!(script, "cd apps/web && export OK=1 && ./build");
    }

    #[test]
    fn render_quotes_hostile_values() {
        let script = SshShell::render(&command(vec![("REF", "x'; rm -rf ~")]));
        assert!(script.contains("export REF='x'\\''; rm -rf ~'"));
    }

    #[test]
    fn timed_step_is_bounded_on_the_remote_host() {
        let session = Rc::new(RemoteSession::open(&SessionConfig::default()).unwrap());
        let shell = SshShell::new(session, "h", "ssh", vec![], ProcessRunner::default())
            .with_remote_timeout(RemoteTimeout {
                command: "timeout".to_string(),
                kill_grace: Duration::from_secs(10),
            });

        let mut timed = command(vec![("OK", "1")]);
        timed.script = "./build && echo done".to_string();
        timed.timeout = Some(Duration::from_secs(3600));
        assert_eq!(
            shell.remote_script(&timed),
            "cd apps/web && export OK=1 && exec timeout -k 10 3600 sh -c './build && echo done'"
        );

        // No limit, nothing to enforce remotely.
        timed.timeout = None;
        assert_eq!(
            shell.remote_script(&timed),
            "cd apps/web && export OK=1 && ./build && echo done"
        );
    }

    #[test]
    fn remote_timeout_without_grace_and_below_a_second() {
        let remote = RemoteTimeout {
            command: "/usr/bin/timeout".to_string(),
            kill_grace: Duration::ZERO,
        };
        assert_eq!(
            remote.wrap("./deploy", Duration::from_millis(200)),
            "exec /usr/bin/timeout 1 sh -c ./deploy"
        );
    }

    #[test]
    fn unwrapped_without_remote_timeout() {
        let session = Rc::new(RemoteSession::open(&SessionConfig::default()).unwrap());
        let shell = SshShell::new(session, "h", "ssh", vec![], ProcessRunner::default());
        let mut timed = command(vec![]);
        timed.timeout = Some(Duration::from_secs(5));
        assert_eq!(shell.remote_script(&timed), "cd apps/web && ./build");
    }

    #[test]
    fn ssh_command_line_and_url() {
        let session = Rc::new(RemoteSession::open(&SessionConfig::default()).unwrap());
        let shell = SshShell::new(
            session,
            "deploy@h",
            "ssh",
            vec!["-o".into(), "BatchMode=yes".into(), "-i".into(), "/keys/deploy key".into()],
            ProcessRunner::default(),
        );
        assert_eq!(
            shell.ssh_command_line(),
            "ssh -o BatchMode=yes -i '/keys/deploy key'"
        );
        assert_eq!(shell.repository_url("apps/web"), "deploy@h:apps/web");
        assert_eq!(shell.host(), "deploy@h");
    }

    #[cfg(unix)]
    #[test]
    fn run_passes_script_as_last_argument() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("args.log");
        let fake = dir.path().join("fake-ssh");
        std::fs::write(
            &fake,
            format!(
                "#!/bin/sh\nfor a in \"$@\"; do echo \"$a\" >> '{}'; done\nexit 0\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let session = Rc::new(RemoteSession::open(&SessionConfig::default()).unwrap());
        let shell = SshShell::new(
            session,
            "h",
            fake.to_string_lossy(),
            vec!["-o".into(), "BatchMode=yes".into()],
            ProcessRunner::default(),
        );
        shell.run(&command(vec![])).unwrap();

        let args = std::fs::read_to_string(&log).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(args, vec!["-o", "BatchMode=yes", "h", "cd apps/web && ./build"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn remote_timeout_outlives_the_local_client() {
        use std::os::unix::fs::PermissionsExt;

        // Runs the script in its own session, so killing the fake client
        // leaves it running, as with a real sshd.
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-ssh");
        std::fs::write(
            &fake,
            "#!/bin/sh\nfor last; do :; done\nsetsid sh -c \"$last\" &\nwait $!\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
        let workdir = dir.path().join("web");
        std::fs::create_dir_all(&workdir).unwrap();

        let session = Rc::new(RemoteSession::open(&SessionConfig::default()).unwrap());
        let shell = SshShell::new(
            session,
            "h",
            fake.to_string_lossy(),
            vec![],
            ProcessRunner::new(Duration::from_secs(1)),
        )
        .with_remote_timeout(RemoteTimeout {
            command: "timeout".to_string(),
            kill_grace: Duration::from_secs(1),
        });
        let step = RemoteCommand {
            step: RemoteStep::Build,
            workdir: workdir.to_string_lossy().into_owned(),
            script: "sleep 3; touch finished".to_string(),
            env: vec![],
            timeout: Some(Duration::from_secs(1)),
        };

        assert!(shell.run(&step).is_err());
        std::thread::sleep(Duration::from_secs(4));
        assert!(!workdir.join("finished").exists(), "step kept running");
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_remote_failure() {
        let session = Rc::new(RemoteSession::open(&SessionConfig::default()).unwrap());
        // `false` ignores its arguments and exits 1, standing in for ssh.
        let shell = SshShell::new(session, "h", "false", vec![], ProcessRunner::default());
        let err = shell.run(&command(vec![])).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DeployGateError::CommandFailed { code: Some(1), .. }
        ));
    }
}
