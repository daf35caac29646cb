// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cleanup controller: tear environments down and remove workspaces.

use crate::activity_logger::write_phase_log;
use crate::error::CleanupError;
use crate::log_paths::{self, DESCRIPTOR_FILE, LOGS_DIR};
use crate::workspace::WorkspaceState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vt_adapters::{VagrantCommand, VmAdapter};
use vt_core::{epoch_ms_now, Phase, PhaseRecord, PhaseStatus, RunConfig};

/// What a successful cleanup did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupReport {
    /// Nothing was there to clean.
    AlreadyClean,
    Removed {
        /// Teardown record when the environment had been started.
        teardown: Option<PhaseRecord>,
        /// Where the workspace's logs were moved before removal.
        logs_dir: Option<PathBuf>,
    },
}

/// Cleanup outcome for one workspace found by [`Cleanup::destroy_workdir`].
#[derive(Debug)]
pub struct WorkspaceCleanup {
    pub workspace: PathBuf,
    pub result: Result<CleanupReport, CleanupError>,
}

#[derive(Clone)]
pub struct Cleanup<V> {
    adapter: V,
    debug: bool,
    timeout: Duration,
    preserve_logs_in: Option<PathBuf>,
}

impl<V: VmAdapter> Cleanup<V> {
    pub fn new(adapter: V, config: &RunConfig) -> Self {
        Self::with_options(adapter, config.debug, config.timeout)
    }

    pub fn with_options(adapter: V, debug: bool, timeout: Duration) -> Self {
        Self {
            adapter,
            debug,
            timeout,
            preserve_logs_in: None,
        }
    }

    /// Move each workspace's `logs/` under `<run_root>/logs/` before removal.
    pub fn preserving_logs_in(mut self, run_root: impl Into<PathBuf>) -> Self {
        self.preserve_logs_in = Some(run_root.into());
        self
    }

    /// Destroy the environment (if it was started) and remove the workspace.
    ///
    /// Idempotent: a missing workspace is [`CleanupReport::AlreadyClean`].
    /// When teardown fails the workspace is kept so the environment can
    /// still be destroyed from it later.
    pub async fn clean(
        &self,
        workspace: &Path,
        environment_started: bool,
    ) -> Result<CleanupReport, CleanupError> {
        if !workspace.exists() {
            tracing::debug!(workspace = %workspace.display(), "already clean");
            return Ok(CleanupReport::AlreadyClean);
        }

        let mut teardown = if environment_started {
            Some(self.teardown(workspace).await?)
        } else {
            None
        };

        let logs_dir = self.preserve_logs(workspace)?;

        match fs::remove_dir_all(workspace) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CleanupError::Remove {
                    path: workspace.to_path_buf(),
                    source,
                })
            }
        }
        tracing::info!(workspace = %workspace.display(), "workspace removed");

        if let (Some(record), Some(dir)) = (teardown.as_mut(), logs_dir.as_ref()) {
            record.log_path =
                log_paths::relocate(&record.log_path, &log_paths::logs_dir(workspace), dir);
        }
        Ok(CleanupReport::Removed { teardown, logs_dir })
    }

    /// Clean a workspace left by an earlier run, or every workspace under
    /// a run root.
    ///
    /// Whether an environment was started comes from the state file; a
    /// directory without one counts as started when it holds a Vagrantfile.
    pub async fn destroy_workdir(&self, path: &Path) -> io::Result<Vec<WorkspaceCleanup>> {
        if is_workspace(path) {
            let result = self.clean(path, environment_started(path)).await;
            return Ok(vec![WorkspaceCleanup {
                workspace: path.to_path_buf(),
                result,
            }]);
        }

        let mut workspaces: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.file_name().is_some_and(|n| n != LOGS_DIR) && is_workspace(p))
            .collect();
        workspaces.sort();

        let cleanup = self.clone().preserving_logs_in(path);
        let mut results = Vec::with_capacity(workspaces.len());
        for workspace in workspaces {
            let result = cleanup.clean(&workspace, environment_started(&workspace)).await;
            if let Err(e) = &result {
                tracing::warn!(workspace = %workspace.display(), error = %e, "cleanup failed");
            }
            results.push(WorkspaceCleanup { workspace, result });
        }
        Ok(results)
    }

    async fn teardown(&self, workspace: &Path) -> Result<PhaseRecord, CleanupError> {
        let log_path = log_paths::phase_log_path(&log_paths::logs_dir(workspace), "", Phase::Teardown, 1);
        let args = VagrantCommand::Destroy.args(self.debug);

        let started_at_ms = epoch_ms_now();
        let result = self
            .adapter
            .run(Phase::Teardown, &args, workspace, self.timeout)
            .await;
        let finished_at_ms = epoch_ms_now();

        let (status, exit_code, output, failure) = match result {
            Ok(out) if out.success() => (PhaseStatus::Passed, out.exit_code, out.output, None),
            Ok(out) => {
                let reason = match out.exit_code {
                    Some(code) => format!("vagrant destroy exited with code {}", code),
                    None => "vagrant destroy was terminated by a signal".to_string(),
                };
                (PhaseStatus::Failed, out.exit_code, out.output, Some(reason))
            }
            Err(e) => {
                let status = if e.is_timeout() {
                    PhaseStatus::TimedOut
                } else {
                    PhaseStatus::Failed
                };
                (status, None, e.partial_output().to_string(), Some(e.to_string()))
            }
        };
        write_phase_log(&log_path, &output);

        let record = PhaseRecord {
            phase: Phase::Teardown,
            started_at_ms,
            finished_at_ms,
            status,
            exit_code,
            attempts: 1,
            log_path,
            note: failure.clone(),
        };
        match failure {
            None => Ok(record),
            Some(reason) => {
                tracing::warn!(workspace = %workspace.display(), %reason, "teardown failed");
                Err(CleanupError::Teardown {
                    path: workspace.to_path_buf(),
                    reason,
                    record: Box::new(record),
                })
            }
        }
    }

    fn preserve_logs(&self, workspace: &Path) -> Result<Option<PathBuf>, CleanupError> {
        let Some(run_root) = &self.preserve_logs_in else {
            return Ok(None);
        };
        let logs = log_paths::logs_dir(workspace);
        if !logs.is_dir() {
            return Ok(None);
        }
        let name = workspace
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dest = log_paths::preserved_logs_dir(run_root, &name);

        let moved = dest
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| match fs::remove_dir_all(&dest) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            })
            .and_then(|()| fs::rename(&logs, &dest));
        moved.map_err(|source| CleanupError::PreserveLogs { path: logs, source })?;
        Ok(Some(dest))
    }
}

fn is_workspace(path: &Path) -> bool {
    path.is_dir()
        && (log_paths::state_file_path(path).is_file() || path.join(DESCRIPTOR_FILE).is_file())
}

fn environment_started(workspace: &Path) -> bool {
    match WorkspaceState::load(workspace) {
        Ok(Some(state)) => state.bring_up_started,
        Ok(None) => workspace.join(DESCRIPTOR_FILE).is_file(),
        Err(e) => {
            tracing::warn!(
                workspace = %workspace.display(),
                error = %e,
                "unreadable workspace state, assuming environment started"
            );
            true
        }
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
