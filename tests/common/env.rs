//! Test environment builder for isolated deploygate runs.
//!
//! Everything lives in one temp directory:
//!
//! - `work/`: a working repository commits are made in
//! - `repos/web.git`: the bare repository the hook fires for
//! - `remote/`: the login directory of the fake remote host
//! - `bin/ssh`, `bin/rsync`: stand-ins that act on `remote/` locally
//! - `staging/`: mirror state
//! - `config.toml`: points the binary at all of the above

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use super::fixtures::{git, git_available, write_executable};

pub const HOST: &str = "deploy@test";
pub const PROJECT: &str = "web";

/// Result of running the deploygate binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parsed NDJSON lines from stdout, skipping anything that is not JSON
    pub fn json_records(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

pub struct TestEnv {
    pub root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// `None` when git is not installed; callers skip the test then.
    pub fn new() -> Option<Self> {
        Self::with_config("")
    }

    /// Like `new`, appending `extra` to the generated config file
    pub fn with_config(extra: &str) -> Option<Self> {
        if !cfg!(unix) || !git_available() {
            return None;
        }

        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let env = Self {
            root,
            bin: PathBuf::from(env!("CARGO_BIN_EXE_deploygate")),
        };

        for dir in ["work", "repos", "remote", "staging", "home"] {
            std::fs::create_dir_all(env.path(dir)).expect("Failed to create directories");
        }
        git(&env.path("work"), &["init", "-q"]);
        env.install_fake_remote();
        env.write_config(extra);
        Some(env)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn bare_repo(&self) -> PathBuf {
        self.path("repos/web.git")
    }

    pub fn remote_path(&self, relative: &str) -> PathBuf {
        self.path("remote").join(relative)
    }

    pub fn staging_path(&self, relative: &str) -> PathBuf {
        self.path("staging").join(relative)
    }

    /// One line per ssh invocation
    pub fn ssh_log(&self) -> Vec<String> {
        read_lines(&self.path("ssh.log"))
    }

    /// One line per rsync invocation
    pub fn rsync_log(&self) -> Vec<String> {
        read_lines(&self.path("rsync.log"))
    }

    /// Lines appended by the fixture build and deploy scripts
    pub fn steps_log(&self) -> Vec<String> {
        read_lines(&self.remote_path("steps.log"))
    }

    /// Commit `files` (path, content, executable) in the work repo and
    /// publish the commit to `branch` of the bare repository.
    pub fn commit(&self, branch: &str, files: &[(&str, &str, bool)]) -> String {
        let work = self.path("work");
        for (path, content, executable) in files {
            let full = work.join(path);
            if *executable {
                write_executable(&full, content);
            } else {
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent).expect("Failed to create directories");
                }
                std::fs::write(&full, content).expect("Failed to write file");
            }
        }
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-q", "--allow-empty", "-m", "change"]);
        let rev = git(&work, &["rev-parse", "HEAD"]);

        let bare = self.bare_repo();
        if !bare.exists() {
            git(
                &self.path("repos"),
                &["init", "-q", "--bare", "web.git"],
            );
        }
        let refspec = format!("HEAD:refs/heads/{}", branch);
        git(&work, &["push", "-q", bare.to_str().unwrap(), &refspec]);
        rev
    }

    /// Commit the standard build and deploy scripts
    pub fn commit_deployable(&self, build: &str) -> String {
        self.commit(
            "master",
            &[
                ("build", build, true),
                ("deploy", super::fixtures::DEPLOY_SCRIPT, true),
            ],
        )
    }

    /// Run the hook for a ref update of the bare repository
    pub fn run_hook(&self, refname: &str, oldrev: &str, newrev: &str, extra: &[&str]) -> TestResult {
        self.run_hook_with_env(refname, oldrev, newrev, extra, &[])
    }

    /// Like `run_hook`, with extra environment variables
    pub fn run_hook_with_env(
        &self,
        refname: &str,
        oldrev: &str,
        newrev: &str,
        extra: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut args = vec![
            "--refname",
            refname,
            "--uploader",
            "Jo Doe <jo@example.com>",
            "--oldrev",
            oldrev,
            "--newrev",
            newrev,
        ];
        args.extend_from_slice(extra);

        let mut cmd = self.command(&args);
        cmd.env("GIT_DIR", self.bare_repo());
        for (key, value) in env_vars {
            cmd.env(key, value);
        }
        output_to_result(cmd.output().expect("Failed to execute deploygate"))
    }

    /// Run deploygate without `GIT_DIR`
    pub fn run(&self, args: &[&str]) -> TestResult {
        let mut cmd = self.command(args);
        cmd.env_remove("GIT_DIR");
        output_to_result(cmd.output().expect("Failed to execute deploygate"))
    }

    /// Run git inside the remote clone
    pub fn remote_git(&self, args: &[&str]) -> String {
        git(&self.remote_path(PROJECT), args)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.root.path())
            .args(args)
            .env("HOME", self.path("home"))
            .env("DEPLOYGATE_CONFIG", self.path("config.toml"))
            .env_remove("DEPLOYGATE_LOG")
            .env_remove("DEPLOYGATE_REMOTE_HOST")
            .env_remove("DEPLOYGATE_STAGING_ROOT")
            .env_remove("DEPLOYGATE_REPOSITORIES_ROOT")
            .env_remove("DEPLOYGATE_TARGET_BRANCH")
            .env_remove("DEPLOYGATE_SSH_COMMAND")
            .env_remove("DEPLOYGATE_RSYNC_COMMAND");
        cmd
    }

    fn install_fake_remote(&self) {
        let remote = self.path("remote");

        // Runs the last argument as a shell command from the remote login
        // directory. git execs `git-receive-pack '<dir>'` this way.
        write_executable(
            &self.path("bin/ssh"),
            &format!(
                r#"#!/bin/sh
echo "$*" >> '{log}'
for last; do :; done
case "$last" in
  git-*) last="git ${{last#git-}}" ;;
esac
cd '{remote}' && exec sh -c "$last"
"#,
                log = self.path("ssh.log").display(),
                remote = remote.display(),
            ),
        );

        // Copies `<src>/` into `remote/<dir>/` for `rsync ... <src>/ <host>:<dir>/`.
        write_executable(
            &self.path("bin/rsync"),
            &format!(
                r#"#!/bin/sh
echo "$*" >> '{log}'
prev=
last=
for a; do prev=$last; last=$a; done
dest='{remote}'/"${{last#*:}}"
mkdir -p "$dest" && cp -a "$prev." "$dest"
"#,
                log = self.path("rsync.log").display(),
                remote = remote.display(),
            ),
        );
    }

    fn write_config(&self, extra: &str) {
        let config = format!(
            r#"[paths]
staging_root = '{staging}'
repositories_root = '{repos}'

[remote]
host = '{host}'
ssh_command = '{ssh}'
ssh_options = []
rsync_command = '{rsync}'

[session]
pass_env = ["PATH"]

{extra}
"#,
            staging = self.path("staging").display(),
            repos = self.path("repos").display(),
            host = HOST,
            ssh = self.path("bin/ssh").display(),
            rsync = self.path("bin/rsync").display(),
            extra = extra,
        );
        std::fs::write(self.path("config.toml"), config).expect("Failed to write config");
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
