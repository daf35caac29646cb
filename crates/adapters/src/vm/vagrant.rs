// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vagrant subprocess adapter and its command-line contract.

use super::{VmAdapter, VmError, VmOutput};
use crate::subprocess::run_streaming;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use vt_core::Phase;

/// Subcommands the lifecycle issues against `vagrant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VagrantCommand<'a> {
    /// `vagrant up --provider <p>`; `no_provision` defers provisioners to
    /// a separate `vagrant provision` call.
    Up { provider: &'a str, no_provision: bool },
    Provision,
    /// `vagrant ssh -c "sudo bash /vagrant/<script> <args>"`.
    Ssh { script: &'a str, args: &'a [String] },
    Destroy,
    BoxRemove { name: &'a str },
    BoxAdd { name: &'a str, provider: &'a str },
}

impl VagrantCommand<'_> {
    pub fn args(&self, debug: bool) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        match *self {
            VagrantCommand::Up {
                provider,
                no_provision,
            } => {
                args.push("up".into());
                if debug {
                    args.push("--debug".into());
                }
                args.extend(["--provider".into(), provider.into()]);
                if no_provision {
                    args.push("--no-provision".into());
                }
            }
            VagrantCommand::Provision => {
                args.push("provision".into());
                if debug {
                    args.push("--debug".into());
                }
            }
            VagrantCommand::Ssh { script, args: extra } => {
                let mut remote = format!("sudo bash /vagrant/{}", shell_quote(script));
                for arg in extra {
                    remote.push(' ');
                    remote.push_str(&shell_quote(arg));
                }
                args.extend(["ssh".into(), "-c".into(), remote]);
            }
            VagrantCommand::Destroy => {
                args.push("destroy".into());
                if debug {
                    args.push("--debug".into());
                }
                args.push("-f".into());
            }
            VagrantCommand::BoxRemove { name } => {
                args.extend(["box", "remove", name, "--all", "--force"].map(String::from));
            }
            VagrantCommand::BoxAdd { name, provider } => {
                args.extend(["box", "add", name, "--provider", provider, "--force"].map(String::from));
            }
        }
        args
    }
}

/// Quote a word for a POSIX shell, leaving plain words untouched.
pub(crate) fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Runs the real `vagrant` binary.
#[derive(Clone)]
pub struct VagrantAdapter {
    binary: PathBuf,
    debug: bool,
}

impl VagrantAdapter {
    pub fn new(binary: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            binary: binary.into(),
            debug,
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

#[async_trait]
impl VmAdapter for VagrantAdapter {
    async fn run(
        &self,
        phase: Phase,
        args: &[String],
        workdir: &Path,
        timeout: Duration,
    ) -> Result<VmOutput, VmError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).current_dir(workdir);
        if self.debug {
            cmd.env("VAGRANT_LOG", crate::env::DEBUG_VAGRANT_LOG);
        }

        let description = match args.first() {
            Some(sub) => format!("vagrant {}", sub),
            None => "vagrant".to_string(),
        };
        run_streaming(cmd, timeout, &description, |line| {
            tracing::info!(phase = phase.as_str(), "{}", line);
        })
        .await
    }
}

#[cfg(test)]
#[path = "vagrant_tests.rs"]
mod tests;
