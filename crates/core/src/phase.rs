// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle phases, their records, and per-target outcomes.

use crate::lifecycle::PhaseStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One stage of a target's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    BringUp,
    Provision,
    Execute,
    Teardown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BringUp => "bring-up",
            Phase::Provision => "provision",
            Phase::Execute => "execute",
            Phase::Teardown => "teardown",
        }
    }

    /// Outcome recorded when this phase exits non-zero.
    ///
    /// Teardown never decides an outcome, so it has none.
    pub fn failure_outcome(&self) -> Option<Outcome> {
        match self {
            Phase::BringUp => Some(Outcome::BringUpFailed),
            Phase::Provision => Some(Outcome::ProvisionFailed),
            Phase::Execute => Some(Outcome::ExecutionFailed),
            Phase::Teardown => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final classification of a target's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Succeeded,
    BringUpFailed,
    ProvisionFailed,
    ExecutionFailed,
    Timeout,
    /// The workspace could not be prepared; no phase ran.
    WorkspaceFailed,
    /// Operator abort, either mid-run or before the target started.
    Interrupted,
    /// The runner for this target crashed.
    InternalError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::BringUpFailed => "bring-up-failed",
            Outcome::ProvisionFailed => "provision-failed",
            Outcome::ExecutionFailed => "execution-failed",
            Outcome::Timeout => "timeout",
            Outcome::WorkspaceFailed => "workspace-failed",
            Outcome::Interrupted => "interrupted",
            Outcome::InternalError => "internal-error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one executed phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub status: PhaseStatus,
    /// Exit code of the last attempt; `None` if the process never exited
    /// on its own (spawn failure, timeout, interrupt).
    pub exit_code: Option<i32>,
    /// Number of invocations, including retries.
    pub attempts: u32,
    /// Log of the last attempt.
    pub log_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PhaseRecord {
    pub fn elapsed_ms(&self) -> u64 {
        self.finished_at_ms.saturating_sub(self.started_at_ms)
    }
}
