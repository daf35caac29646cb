// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target run results.

use crate::phase::{Outcome, Phase, PhaseRecord};
use crate::target::Target;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Aggregate result for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub target: Target,
    pub outcome: Outcome,
    /// Phase that decided a non-success outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub phases: Vec<PhaseRecord>,
    /// Workspace directory, when it still exists after the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
    /// Where this target's phase logs can be read after the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_dir: Option<PathBuf>,
    /// Best-effort notes (cleanup failures and similar).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl RunResult {
    /// Result for a target that never got a lifecycle.
    pub fn without_phases(target: Target, outcome: Outcome, reason: impl Into<String>) -> Self {
        Self {
            target,
            outcome,
            failed_phase: None,
            reason: Some(reason.into()),
            phases: Vec::new(),
            workspace: None,
            logs_dir: None,
            notes: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|r| r.phase == phase)
    }

    /// Log most relevant to the outcome: the failing phase's log, otherwise
    /// the payload output.
    pub fn primary_log(&self) -> Option<&Path> {
        let phase = self.failed_phase.unwrap_or(Phase::Execute);
        self.phase(phase).map(|r| r.log_path.as_path())
    }

    /// Total wall time from the first phase start to the last phase end.
    pub fn elapsed_ms(&self) -> u64 {
        let start = self.phases.iter().map(|r| r.started_at_ms).min();
        let end = self.phases.iter().map(|r| r.finished_at_ms).max();
        match (start, end) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
