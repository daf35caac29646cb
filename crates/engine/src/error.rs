// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use vt_adapters::VmError;
use vt_core::{Phase, PhaseRecord, PhaseStatus};

/// Failure to prepare a target's workspace. Fatal for that target only.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("cannot create run directory {path}: {source}")]
    RunRoot {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("workspace {path} already exists and is not empty")]
    Collision { path: PathBuf },
    #[error("cannot create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failure after the workspace directory was created.
    #[error("cannot write {file} in workspace {workspace}: {source}")]
    Populate {
        workspace: PathBuf,
        file: PathBuf,
        source: std::io::Error,
    },
}

impl WorkspaceError {
    /// Directory this error left behind, if one was created.
    pub fn workspace(&self) -> Option<&Path> {
        match self {
            WorkspaceError::Populate { workspace, .. } => Some(workspace),
            _ => None,
        }
    }
}

/// Why a lifecycle phase did not pass.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("{phase} exited with code {code}")]
    NonZeroExit { phase: Phase, code: i32 },
    #[error("{phase} was terminated by a signal")]
    Killed { phase: Phase },
    #[error("{phase} timed out after {}s", after.as_secs())]
    TimedOut { phase: Phase, after: Duration },
    #[error("{phase} could not run: {source}")]
    Vm { phase: Phase, source: VmError },
    #[error("{phase} interrupted")]
    Interrupted { phase: Phase },
}

impl PhaseError {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseError::NonZeroExit { phase, .. }
            | PhaseError::Killed { phase }
            | PhaseError::TimedOut { phase, .. }
            | PhaseError::Vm { phase, .. }
            | PhaseError::Interrupted { phase } => *phase,
        }
    }

    /// Status recorded on the phase; decides the lifecycle transition.
    pub fn status(&self) -> PhaseStatus {
        match self {
            PhaseError::TimedOut { .. } => PhaseStatus::TimedOut,
            PhaseError::Interrupted { .. } => PhaseStatus::Interrupted,
            PhaseError::NonZeroExit { .. } | PhaseError::Killed { .. } | PhaseError::Vm { .. } => {
                PhaseStatus::Failed
            }
        }
    }

    /// Whether another attempt could change the result.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PhaseError::NonZeroExit { .. } | PhaseError::Killed { .. })
    }
}

/// Best-effort cleanup failure. Never changes a target's outcome.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// The environment could not be destroyed; the workspace is kept so
    /// `vt destroy` can retry.
    #[error("teardown failed in {path}: {reason}")]
    Teardown {
        path: PathBuf,
        reason: String,
        record: Box<PhaseRecord>,
    },
    #[error("cannot preserve logs from {path}: {source}")]
    PreserveLogs {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot remove workspace {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CleanupError {
    pub fn teardown_record(&self) -> Option<&PhaseRecord> {
        match self {
            CleanupError::Teardown { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
