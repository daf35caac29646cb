// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VM manager adapters

mod vagrant;

pub use vagrant::{VagrantAdapter, VagrantCommand};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResponse, FakeVmAdapter, VmCall};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use vt_core::{ConfigError, Phase};

/// Errors from a VM manager invocation.
///
/// A process that ran and exited non-zero is not an error; see [`VmOutput`].
#[derive(Debug, Error)]
pub enum VmError {
    #[error("{description} failed to start: {message}")]
    Spawn {
        description: String,
        message: String,
    },
    #[error("{description} failed: {message}")]
    Io {
        description: String,
        message: String,
    },
    #[error("{description} timed out after {}s", after.as_secs())]
    Timeout {
        description: String,
        after: Duration,
        /// Output captured before the process was killed.
        output: String,
    },
}

impl VmError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, VmError::Timeout { .. })
    }

    /// Output captured before the failure, if any.
    pub fn partial_output(&self) -> &str {
        match self {
            VmError::Timeout { output, .. } => output,
            _ => "",
        }
    }
}

/// Exit status and combined stdout/stderr of a finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub output: String,
}

impl VmOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Narrow capability over the external VM manager.
///
/// One call is one subprocess invocation with `workdir` as its working
/// directory. `phase` tags the call for logging and lets fakes script
/// per-phase behavior; it never changes the command line.
#[async_trait]
pub trait VmAdapter: Clone + Send + Sync + 'static {
    async fn run(
        &self,
        phase: Phase,
        args: &[String],
        workdir: &Path,
        timeout: Duration,
    ) -> Result<VmOutput, VmError>;
}

/// Resolve the VM manager binary: explicit value, then `VT_VAGRANT_BIN`,
/// then `vagrant`, and require it to be found (on `PATH` for bare names).
pub fn resolve_binary(explicit: Option<&str>) -> Result<PathBuf, ConfigError> {
    let name = explicit
        .map(str::to_string)
        .or_else(crate::env::vagrant_bin)
        .unwrap_or_else(|| vt_core::config::DEFAULT_VAGRANT_BIN.to_string());
    which::which(&name).map_err(|_| ConfigError::VmManagerNotFound(name))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
