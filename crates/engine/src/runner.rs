// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle runner: drives one target from workspace to result.
//!
//! The runner never picks a phase itself. It asks [`Lifecycle`] for the
//! next phase, runs it through the VM adapter, and feeds the status back.

use crate::activity_logger::{write_phase_log, TargetLogger};
use crate::cleanup::{Cleanup, CleanupReport};
use crate::error::{PhaseError, WorkspaceError};
use crate::log_paths;
use crate::workspace::{Workspace, WorkspaceBuilder};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use vt_adapters::{VagrantCommand, VmAdapter, VmError, VmOutput};
use vt_core::{
    epoch_ms_now, format_duration_ms, Lifecycle, Outcome, Phase, PhaseRecord, PhaseStatus,
    RunConfig, RunResult, Target,
};

/// Bring-up output that points at a broken local box rather than the guest.
const BOX_IMPORT_ERRORS: &[&str] = &["E_INVALIDARG", "VBoxManage"];

#[derive(Clone)]
pub struct Runner<V> {
    adapter: V,
    config: Arc<RunConfig>,
    builder: WorkspaceBuilder,
    cleanup: Cleanup<V>,
    cancel: CancellationToken,
}

/// One VM manager invocation raced against the cancel token.
enum Invocation {
    Finished(VmOutput),
    Failed(VmError),
    Interrupted,
}

/// A phase run to completion, retries included.
struct PhaseRun {
    record: PhaseRecord,
    error: Option<PhaseError>,
    notes: Vec<String>,
}

impl<V: VmAdapter> Runner<V> {
    pub fn new(
        adapter: V,
        config: Arc<RunConfig>,
        builder: WorkspaceBuilder,
        cancel: CancellationToken,
    ) -> Self {
        let cleanup =
            Cleanup::new(adapter.clone(), &config).preserving_logs_in(builder.root().path());
        Self {
            adapter,
            config,
            builder,
            cleanup,
            cancel,
        }
    }

    /// Run one target end to end. Never fails: every problem becomes part
    /// of the returned [`RunResult`].
    pub async fn run(&self, target: Target) -> RunResult {
        let span = tracing::info_span!("target", box_name = %target);
        self.run_target(target).instrument(span).await
    }

    async fn run_target(&self, target: Target) -> RunResult {
        if self.cancel.is_cancelled() {
            tracing::info!("interrupted before start");
            return RunResult::without_phases(target, Outcome::Interrupted, "not started");
        }
        let mut workspace = match self.builder.build(&target, &self.config) {
            Ok(ws) => ws,
            Err(e) => return self.workspace_failed(target, e).await,
        };
        let mut logger = TargetLogger::new(&workspace.logs_dir(), &target);
        logger.append("workspace", &format!("created {}", workspace.path().display()));

        if self.cancel.is_cancelled() {
            logger.append("result", Outcome::Interrupted.as_str());
            return self
                .finish_unstarted(target, &workspace, Outcome::Interrupted, "interrupted before bring-up")
                .await;
        }
        if let Err(e) = workspace.mark_started() {
            let reason = format!("cannot update workspace state: {}", e);
            logger.append("workspace", &reason);
            return self
                .finish_unstarted(target, &workspace, Outcome::WorkspaceFailed, &reason)
                .await;
        }

        let mut lifecycle = Lifecycle::new(self.config.provisioner.is_some());
        let mut phases = Vec::new();
        let mut notes = Vec::new();
        let mut reason = None;

        let mut next = match lifecycle.start() {
            Ok(phase) => Some(phase),
            Err(e) => {
                tracing::error!(error = %e, "lifecycle refused to start");
                None
            }
        };
        while let Some(phase) = next {
            let run = self.run_phase(phase, &target, &workspace, &logger).await;
            let status = run.record.status;
            phases.push(run.record);
            notes.extend(run.notes);
            if let Some(e) = run.error {
                reason = Some(e.to_string());
            }
            next = lifecycle.complete(status).unwrap_or_else(|e| {
                tracing::error!(error = %e, "invalid lifecycle transition");
                None
            });
        }

        let outcome = lifecycle.outcome().unwrap_or(Outcome::Interrupted);
        let failed_phase = lifecycle.failed_phase();
        let mut logs_dir = Some(workspace.logs_dir());
        let mut retained = Some(workspace.path().to_path_buf());

        if self.config.cleanup && lifecycle.needs_teardown() {
            logger.append("teardown", "started");
            match self.cleanup.clean(workspace.path(), lifecycle.environment_started()).await {
                Ok(report) => {
                    if let CleanupReport::Removed {
                        teardown,
                        logs_dir: preserved,
                    } = report
                    {
                        phases.extend(teardown);
                        logs_dir = preserved;
                    }
                    if let Some(dir) = &logs_dir {
                        relocate_logs(&mut phases, &workspace.logs_dir(), dir);
                        logger = TargetLogger::new(dir, &target);
                        logger.append("teardown", "passed, workspace removed");
                    }
                    retained = None;
                    if let Err(e) = lifecycle.tear_down() {
                        tracing::error!(error = %e, "invalid lifecycle transition");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cleanup failed");
                    logger.append("teardown", &format!("failed: {}", e));
                    phases.extend(e.teardown_record().cloned());
                    notes.push(e.to_string());
                }
            }
        }

        tracing::info!(outcome = outcome.as_str(), "target finished");
        if logs_dir.is_some() {
            logger.append("result", outcome.as_str());
        }
        RunResult {
            target,
            outcome,
            failed_phase,
            reason,
            phases,
            workspace: retained,
            logs_dir,
            notes,
        }
    }

    /// Run a phase, retrying and repairing the box as configured.
    async fn run_phase(
        &self,
        phase: Phase,
        target: &Target,
        workspace: &Workspace,
        logger: &TargetLogger,
    ) -> PhaseRun {
        let args = self.phase_args(phase);
        let slug = target.slug();
        let logs_dir = workspace.logs_dir();
        let mut retries_left = self.config.retries;
        let mut repair_available = phase == Phase::BringUp && self.config.box_repair;
        let mut notes = Vec::new();
        let started_at_ms = epoch_ms_now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let log_path = log_paths::phase_log_path(&logs_dir, &slug, phase, attempt);
            logger.append(phase.as_str(), &format!("started (attempt {})", attempt));

            let (exit_code, output, error) = match self.invoke(phase, &args, workspace.path()).await {
                Invocation::Finished(out) => {
                    let error = match out.exit_code {
                        Some(0) => None,
                        Some(code) => Some(PhaseError::NonZeroExit { phase, code }),
                        None => Some(PhaseError::Killed { phase }),
                    };
                    (out.exit_code, out.output, error)
                }
                Invocation::Failed(e) => {
                    let output = e.partial_output().to_string();
                    let error = if e.is_timeout() {
                        PhaseError::TimedOut {
                            phase,
                            after: self.config.timeout,
                        }
                    } else {
                        PhaseError::Vm { phase, source: e }
                    };
                    (None, output, Some(error))
                }
                Invocation::Interrupted => (None, String::new(), Some(PhaseError::Interrupted { phase })),
            };
            write_phase_log(&log_path, &output);

            let Some(error) = error else {
                let record = PhaseRecord {
                    phase,
                    started_at_ms,
                    finished_at_ms: epoch_ms_now(),
                    status: PhaseStatus::Passed,
                    exit_code,
                    attempts: attempt,
                    log_path,
                    note: None,
                };
                logger.append(
                    phase.as_str(),
                    &format!("passed in {}", format_duration_ms(record.elapsed_ms())),
                );
                return PhaseRun {
                    record,
                    error: None,
                    notes,
                };
            };
            logger.append(
                phase.as_str(),
                &format!("{} (log: {})", error, log_path.display()),
            );

            if repair_available && error.is_retryable() && needs_box_repair(&output) {
                repair_available = false;
                match self.repair_box(target, workspace.path(), &logs_dir, &slug).await {
                    Ok(()) => {
                        logger.append(phase.as_str(), "box re-added, retrying");
                        notes.push(format!("box {} re-added after an import error", target));
                        continue;
                    }
                    Err(reason) => {
                        logger.append(phase.as_str(), &format!("box repair failed: {}", reason));
                        notes.push(format!("box repair failed: {}", reason));
                    }
                }
            }
            if error.is_retryable() && retries_left > 0 {
                retries_left -= 1;
                tracing::warn!(phase = phase.as_str(), attempt, error = %error, "retrying");
                continue;
            }

            return PhaseRun {
                record: PhaseRecord {
                    phase,
                    started_at_ms,
                    finished_at_ms: epoch_ms_now(),
                    status: error.status(),
                    exit_code,
                    attempts: attempt,
                    log_path,
                    note: Some(error.to_string()),
                },
                error: Some(error),
                notes,
            };
        }
    }

    async fn invoke(&self, phase: Phase, args: &[String], workdir: &Path) -> Invocation {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Invocation::Interrupted,
            result = self.adapter.run(phase, args, workdir, self.config.timeout) => match result {
                Ok(out) => Invocation::Finished(out),
                Err(e) => Invocation::Failed(e),
            },
        }
    }

    fn phase_args(&self, phase: Phase) -> Vec<String> {
        let config = &self.config;
        let command = match phase {
            Phase::BringUp => VagrantCommand::Up {
                provider: &config.provider,
                no_provision: config.provisioner.is_some(),
            },
            Phase::Provision => VagrantCommand::Provision,
            Phase::Execute => {
                let script = config.script_name();
                return VagrantCommand::Ssh {
                    script: &script,
                    args: &config.script_args,
                }
                .args(config.debug);
            }
            Phase::Teardown => VagrantCommand::Destroy,
        };
        command.args(config.debug)
    }

    /// Remove and re-add the target's box. Removal may fail (the box may
    /// be half-imported); re-adding must succeed.
    async fn repair_box(
        &self,
        target: &Target,
        workdir: &Path,
        logs_dir: &Path,
        slug: &str,
    ) -> Result<(), String> {
        let commands = [
            (VagrantCommand::BoxRemove { name: target.as_str() }, false),
            (
                VagrantCommand::BoxAdd {
                    name: target.as_str(),
                    provider: &self.config.provider,
                },
                true,
            ),
        ];
        let mut log = String::new();
        let mut result = Ok(());
        for (command, required) in commands {
            let args = command.args(self.config.debug);
            let description = format!("vagrant {}", args.join(" "));
            tracing::info!(command = %description, "repairing box");
            log.push_str(&format!("$ {}\n", description));
            let failure = match self.invoke(Phase::BringUp, &args, workdir).await {
                Invocation::Finished(out) => {
                    log.push_str(&out.output);
                    (!out.success()).then(|| match out.exit_code {
                        Some(code) => format!("{} exited with code {}", description, code),
                        None => format!("{} was terminated by a signal", description),
                    })
                }
                Invocation::Failed(e) => {
                    log.push_str(e.partial_output());
                    Some(e.to_string())
                }
                Invocation::Interrupted => Some(format!("{} interrupted", description)),
            };
            if let Some(reason) = failure {
                log.push_str(&format!("{}\n", reason));
                if required {
                    result = Err(reason);
                    break;
                }
            }
        }
        write_phase_log(&log_paths::box_repair_log_path(logs_dir, slug), &log);
        result
    }

    async fn workspace_failed(&self, target: Target, error: WorkspaceError) -> RunResult {
        tracing::error!(error = %error, "workspace preparation failed");
        let mut result = RunResult::without_phases(target, Outcome::WorkspaceFailed, error.to_string());
        if let Some(path) = error.workspace() {
            self.discard(path, &mut result).await;
        }
        result
    }

    async fn finish_unstarted(
        &self,
        target: Target,
        workspace: &Workspace,
        outcome: Outcome,
        reason: &str,
    ) -> RunResult {
        let mut result = RunResult::without_phases(target, outcome, reason);
        result.logs_dir = Some(workspace.logs_dir());
        self.discard(workspace.path(), &mut result).await;
        result
    }

    /// Record a workspace whose environment never started, removing it
    /// when cleanup is on.
    async fn discard(&self, path: &Path, result: &mut RunResult) {
        result.workspace = Some(path.to_path_buf());
        if !self.config.cleanup {
            return;
        }
        match self.cleanup.clean(path, false).await {
            Ok(CleanupReport::Removed { logs_dir, .. }) => {
                result.workspace = None;
                result.logs_dir = logs_dir;
            }
            Ok(CleanupReport::AlreadyClean) => result.workspace = None,
            Err(e) => {
                tracing::warn!(error = %e, "cleanup failed");
                result.notes.push(e.to_string());
            }
        }
    }
}

fn needs_box_repair(output: &str) -> bool {
    BOX_IMPORT_ERRORS.iter().any(|marker| output.contains(marker))
}

fn relocate_logs(phases: &mut [PhaseRecord], from: &Path, to: &Path) {
    for record in phases {
        record.log_path = log_paths::relocate(&record.log_path, from, to);
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
