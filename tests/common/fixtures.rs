//! Reusable fixture content and git helpers.

use std::path::Path;
use std::process::Command;

pub const ZERO_REV: &str = "0000000000000000000000000000000000000000";

/// Build script that records its run next to the remote clone
pub const BUILD_SCRIPT: &str = "#!/bin/sh\necho \"build $DEPLOYGATE_REVISION\" >> ../steps.log\n";

pub const DEPLOY_SCRIPT: &str = "#!/bin/sh\necho \"deploy $DEPLOYGATE_PROJECT $DEPLOYGATE_REFNAME\" >> ../steps.log\n";

pub const FAILING_BUILD_SCRIPT: &str =
    "#!/bin/sh\necho 'compiling...'\necho 'error: out of cheese' >&2\nexit 3\n";

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity; returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", dir)
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "init.defaultBranch=master",
        ])
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed:\n{}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn write_executable(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(path, content).expect("Failed to write file");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to set permissions");
    }
}
