// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-target activity log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use vt_core::Target;

use crate::log_paths;

/// Writes human-readable timestamped lines to `<logs_dir>/<slug>.log`.
///
/// Each `append()` call opens, writes, and closes the file. A target
/// records a handful of lines per phase, so this stays cheap.
pub struct TargetLogger {
    path: PathBuf,
    target: Target,
}

impl TargetLogger {
    pub fn new(logs_dir: &Path, target: &Target) -> Self {
        Self {
            path: log_paths::activity_log_path(logs_dir, &target.slug()),
            target: target.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a log line.
    ///
    /// Format: `2026-01-30T08:14:09Z [bring-up] started (attempt 1)`
    ///
    /// Failures are logged via tracing but do not propagate; a full disk
    /// must not change a target's outcome.
    pub fn append(&self, label: &str, message: &str) {
        if let Err(e) = self.write_line(label, message) {
            tracing::warn!(
                box_name = %self.target,
                error = %e,
                "failed to write activity log"
            );
        }
    }

    fn write_line(&self, label: &str, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        writeln!(file, "{} [{}] {}", ts, label, message)?;
        Ok(())
    }
}

/// Write the captured output of one VM manager invocation.
///
/// Failures are logged and swallowed like activity log writes.
pub(crate) fn write_phase_log(path: &Path, output: &str) {
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, output));
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "failed to write phase log");
    }
}

#[cfg(test)]
#[path = "activity_logger_tests.rs"]
mod tests;
