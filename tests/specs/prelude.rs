//! Test helpers for the black-box CLI tests.
//!
//! Provides a small DSL for running `vt` inside a throwaway project that
//! carries a payload script and a fake `vagrant` on `VT_VAGRANT_BIN`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Stand-in for `vagrant`, run with the workspace as its working directory.
///
/// - `up` fails for boxes whose name contains "broken", fails once for
///   "flaky", and fails once with a VirtualBox import error for "corrupt".
/// - `ssh -c "sudo bash /vagrant/<script> …"` runs the script locally from
///   the workspace with `VT_BOX` set to the box name.
/// - Every call is appended to `$FAKE_VAGRANT_LOG` as `<box> <args>`.
pub const FAKE_VAGRANT: &str = r#"#!/bin/sh
box=$(sed -n 's/^  config.vm.box = "\(.*\)"$/\1/p' Vagrantfile 2>/dev/null)
if [ -n "$FAKE_VAGRANT_LOG" ]; then
  echo "$box $*" >> "$FAKE_VAGRANT_LOG"
fi
case "$1" in
  up)
    echo "==> default: Importing base box '$box'..."
    case "$box" in
      *broken*) echo "The box '$box' could not be found." >&2; exit 1 ;;
      *flaky*)
        if [ ! -e .fake-flaked ]; then
          touch .fake-flaked
          echo "Timed out while waiting for the machine to boot." >&2
          exit 1
        fi
        ;;
      *corrupt*)
        if [ ! -e .fake-repaired ]; then
          echo "VBoxManage: error: Code E_INVALIDARG (0x80070057)" >&2
          exit 1
        fi
        ;;
    esac
    touch .fake-running
    echo "==> default: Machine booted and ready!"
    ;;
  provision)
    echo "==> default: Running provisioner"
    ;;
  ssh)
    cmd=$(printf '%s' "$3" | sed -e 's/^sudo //' -e 's#/vagrant/#./#')
    VT_BOX="$box" sh -c "$cmd"
    exit $?
    ;;
  box)
    [ "$2" = "add" ] && touch .fake-repaired
    echo "==> box: $2 $3"
    ;;
  destroy)
    rm -f .fake-running
    echo "==> default: Destroying VM and associated drives..."
    ;;
  *)
    echo "unsupported: $*" >&2
    exit 2
    ;;
esac
"#;

/// Payload that fails on `ubuntu/focal64`, stalls on `slow/box`, and
/// echoes its arguments elsewhere.
pub const PAYLOAD: &str = r#"#!/usr/bin/env bash
set -eu
case "$VT_BOX" in
  ubuntu/focal64) echo "unsupported release: $VT_BOX" >&2; exit 3 ;;
  slow/box) sleep 5 ;;
esac
echo "installed on $VT_BOX with args: $*"
"#;

/// Returns the path to the `vt` binary, checking the llvm-cov target first.
fn vt_binary() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug/vt");
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }
    assert_cmd::cargo::cargo_bin("vt")
}

/// Create a CLI builder for vt commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("NO_COLOR".into(), "1".into()),
                ("RUST_LOG".into(), "warn".into()),
            ],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(vt_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd.env_remove("VT_TIMEOUT_SECS");
        cmd.env_remove("COLOR");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    fn output(self) -> Output {
        self.command().output().expect("command should run")
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.output();
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect the given exit code
    pub fn exits(self, code: i32) -> RunAssert {
        let output = self.output();
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit code\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect exit code 1
    pub fn fails(self) -> RunAssert {
        self.exits(1)
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    /// Assert stderr equals expected exactly (with diff on failure).
    pub fn stderr_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stderr(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    /// Parse stdout as JSON (for `-o json` runs).
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).expect("stdout should be JSON")
    }
}

// =============================================================================
// Project
// =============================================================================

/// Temporary project: payload script, fake vagrant, and a run directory.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        project.executable("bin/vagrant", FAKE_VAGRANT);
        project.executable("install.sh", PAYLOAD);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where workspaces go when `--workdir` is passed via [`Project::up`].
    pub fn run_dir(&self) -> PathBuf {
        self.path().join("run")
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        full_path
    }

    fn executable(&self, path: &str, content: &str) {
        let full_path = self.file(path, content);
        std::fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Calls recorded by the fake vagrant, one `<box> <args>` per line.
    pub fn vagrant_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.path().join("vagrant.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Run vt in this project's context
    pub fn vt(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("VT_VAGRANT_BIN", self.path().join("bin/vagrant"))
            .env("FAKE_VAGRANT_LOG", self.path().join("vagrant.log"))
    }

    /// `vt up install.sh --workdir run <args>`
    pub fn up(&self, args: &[&str]) -> CliBuilder {
        let run_dir = self.run_dir().display().to_string();
        self.vt()
            .args(&["up", "install.sh", "--workdir", &run_dir])
            .args(args)
    }

    /// Workspace directories left under the run directory.
    pub fn workspaces(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.run_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().is_dir())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| name != "logs")
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
