// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run configuration.
//!
//! A [`RunConfig`] is resolved once from the command line, validated, and then
//! shared read-only by every runner for the whole run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default provider passed to `vagrant up --provider`.
pub const DEFAULT_PROVIDER: &str = "virtualbox";

/// Default VM manager binary.
pub const DEFAULT_VAGRANT_BIN: &str = "vagrant";

/// Default per-invocation timeout (10 minutes).
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors in the inputs of a run, detected before any workspace exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("specify either --box or --boxes")]
    NoTargetSource,
    #[error("--box and --boxes are mutually exclusive")]
    ConflictingTargetSources,
    #[error("box name must not be empty")]
    EmptyTarget,
    #[error("cannot read box list {path}: {source}")]
    TargetListUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no boxes found in {0}")]
    NoTargets(PathBuf),
    #[error("script not found: {0}")]
    ScriptNotFound(PathBuf),
    #[error("provision file not found: {0}")]
    ArtifactNotFound(PathBuf),
    #[error("--provisioner {0} requires --provision-path")]
    ProvisionerWithoutArtifact(ProvisionerKind),
    #[error("--provision-path requires --provisioner")]
    ArtifactWithoutProvisioner,
    #[error("parallelism must be at least 1")]
    InvalidParallelism,
    #[error("provider must not be empty")]
    EmptyProvider,
    #[error("workdir is not a directory: {0}")]
    WorkdirNotDirectory(PathBuf),
    #[error("{0} not found on PATH")]
    VmManagerNotFound(String),
}

/// Provisioner tools understood by the environment descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionerKind {
    Shell,
    Ansible,
}

impl fmt::Display for ProvisionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionerKind::Shell => write!(f, "shell"),
            ProvisionerKind::Ansible => write!(f, "ansible"),
        }
    }
}

/// A configured provisioner and the artifact it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioner {
    pub kind: ProvisionerKind,
    pub artifact: PathBuf,
}

impl Provisioner {
    /// Pair a provisioner kind with its artifact; both or neither.
    pub fn from_parts(
        kind: Option<ProvisionerKind>,
        artifact: Option<PathBuf>,
    ) -> Result<Option<Self>, ConfigError> {
        match (kind, artifact) {
            (Some(kind), Some(artifact)) => Ok(Some(Self { kind, artifact })),
            (Some(kind), None) => Err(ConfigError::ProvisionerWithoutArtifact(kind)),
            (None, Some(_)) => Err(ConfigError::ArtifactWithoutProvisioner),
            (None, None) => Ok(None),
        }
    }
}

/// Resolved options governing one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub provider: String,
    /// Maximum number of targets in flight.
    pub parallel: usize,
    pub debug: bool,
    /// Payload script executed inside each environment.
    pub script: PathBuf,
    /// Extra arguments forwarded to the payload script.
    pub script_args: Vec<String>,
    pub provisioner: Option<Provisioner>,
    /// Tear down environments and remove workspaces when a target finishes.
    pub cleanup: bool,
    /// Fixed parent directory for workspaces instead of a fresh temp root.
    pub workdir: Option<PathBuf>,
    /// Timeout applied to each VM manager invocation.
    pub timeout: Duration,
    /// Extra attempts for bring-up, provision and execute.
    pub retries: u32,
    /// Re-add the box and retry bring-up once after an import error.
    pub box_repair: bool,
    pub vagrant_bin: String,
}

impl RunConfig {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            parallel: 1,
            debug: false,
            script: script.into(),
            script_args: Vec::new(),
            provisioner: None,
            cleanup: false,
            workdir: None,
            timeout: DEFAULT_PHASE_TIMEOUT,
            retries: 0,
            box_repair: true,
            vagrant_bin: DEFAULT_VAGRANT_BIN.to_string(),
        }
    }

    /// Check every input that can be checked without touching the VM manager.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !self.script.is_file() {
            return Err(ConfigError::ScriptNotFound(self.script));
        }
        if let Some(provisioner) = &self.provisioner {
            if !provisioner.artifact.is_file() {
                return Err(ConfigError::ArtifactNotFound(provisioner.artifact.clone()));
            }
        }
        if self.parallel == 0 {
            return Err(ConfigError::InvalidParallelism);
        }
        if self.provider.trim().is_empty() {
            return Err(ConfigError::EmptyProvider);
        }
        if let Some(workdir) = &self.workdir {
            if workdir.exists() && !workdir.is_dir() {
                return Err(ConfigError::WorkdirNotDirectory(workdir.clone()));
            }
        }
        Ok(self)
    }

    /// File name of the payload script inside a workspace.
    pub fn script_name(&self) -> String {
        file_name(&self.script)
    }

    /// File name of the provisioning artifact inside a workspace.
    pub fn artifact_name(&self) -> Option<String> {
        self.provisioner.as_ref().map(|p| file_name(&p.artifact))
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
