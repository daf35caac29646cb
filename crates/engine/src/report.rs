// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consolidated run report

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use vt_core::{Outcome, RunResult};

/// One result per target, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_root: PathBuf,
    pub results: Vec<RunResult>,
}

impl RunReport {
    pub fn new(run_root: PathBuf, results: Vec<RunResult>) -> Self {
        Self { run_root, results }
    }

    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(RunResult::is_success)
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> Vec<&RunResult> {
        self.results.iter().filter(|r| !r.is_success()).collect()
    }

    /// True if any target was interrupted by the operator.
    pub fn interrupted(&self) -> bool {
        self.results.iter().any(|r| r.outcome == Outcome::Interrupted)
    }

    /// Plain-text summary naming each failed target, the phase that
    /// failed and where to read its log.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} of {} boxes succeeded\n",
            self.succeeded(),
            self.results.len()
        );
        let failures = self.failures();
        if !failures.is_empty() {
            out.push_str("failed:\n");
        }
        for result in failures {
            let _ = write!(out, "  {}: {}", result.target, result.outcome);
            if let Some(phase) = result.failed_phase {
                let _ = write!(out, " in {}", phase);
            }
            match (result.primary_log(), &result.reason) {
                (Some(log), _) => {
                    let _ = write!(out, " (log: {})", log.display());
                }
                (None, Some(reason)) => {
                    let _ = write!(out, " ({})", reason);
                }
                (None, None) => {}
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
