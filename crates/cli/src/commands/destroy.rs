// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vt destroy --workdir DIR` - tear down boxes left by an earlier run

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use vt_adapters::{resolve_binary, TracedVm, VagrantAdapter, VmAdapter};
use vt_engine::{Cleanup, CleanupReport, WorkspaceCleanup};

use crate::exit_error::{self, ExitError};
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Run root or single workspace to clean
    #[arg(long, value_name = "DIR")]
    pub workdir: PathBuf,

    /// Verbose logging and `vagrant --debug`
    #[arg(long)]
    pub debug: bool,

    /// Timeout for each vagrant invocation, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// VM manager binary (default: $VT_VAGRANT_BIN, then vagrant)
    #[arg(long, value_name = "BIN")]
    pub vagrant_bin: Option<String>,
}

/// Cleanup result for one workspace, as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupEntry {
    pub workspace: PathBuf,
    pub status: &'static str,
    /// Teardown log, or the preserved logs directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&WorkspaceCleanup> for CleanupEntry {
    fn from(cleanup: &WorkspaceCleanup) -> Self {
        let (status, log, error) = match &cleanup.result {
            Ok(CleanupReport::AlreadyClean) => ("already-clean", None, None),
            Ok(CleanupReport::Removed { teardown, logs_dir }) => (
                "removed",
                teardown
                    .as_ref()
                    .map(|r| r.log_path.clone())
                    .or_else(|| logs_dir.clone()),
                None,
            ),
            Err(e) => (
                "failed",
                e.teardown_record().map(|r| r.log_path.clone()),
                Some(e.to_string()),
            ),
        };
        Self {
            workspace: cleanup.workspace.clone(),
            status,
            log,
            error,
        }
    }
}

pub async fn handle(args: DestroyArgs, format: OutputFormat) -> Result<()> {
    let binary = resolve_binary(args.vagrant_bin.as_deref())?;
    let adapter = TracedVm::new(VagrantAdapter::new(binary, args.debug));
    let cleanup = Cleanup::with_options(adapter, args.debug, super::phase_timeout(args.timeout));

    let entries = destroy(&cleanup, &args.workdir).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => {
            write_entries(&entries, &args.workdir, crate::color::should_colorize(), &mut out)?
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?,
    }

    if entries.iter().any(|e| e.error.is_some()) {
        return Err(ExitError::silent(exit_error::FAILED).into());
    }
    Ok(())
}

/// Clean everything under `path`; a missing path has nothing to clean.
pub(crate) async fn destroy<V: VmAdapter>(
    cleanup: &Cleanup<V>,
    path: &Path,
) -> Result<Vec<CleanupEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let results = cleanup
        .destroy_workdir(path)
        .await
        .with_context(|| format!("cannot scan {}", path.display()))?;
    Ok(results.iter().map(CleanupEntry::from).collect())
}

pub(crate) fn write_entries(
    entries: &[CleanupEntry],
    path: &Path,
    colorize: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "nothing to destroy in {}", path.display());
    }
    let mut table = Table::with_color(
        vec![
            Column::left("WORKSPACE"),
            Column::status("STATUS"),
            Column::muted("DETAIL"),
        ],
        colorize,
    );
    for entry in entries {
        let detail = match (&entry.error, &entry.log) {
            (Some(error), _) => error.clone(),
            (None, Some(log)) => log.display().to_string(),
            (None, None) => "-".to_string(),
        };
        table.row(vec![
            entry.workspace.display().to_string(),
            entry.status.to_string(),
            detail,
        ]);
    }
    table.render(out);
    Ok(())
}

#[cfg(test)]
#[path = "destroy_tests.rs"]
mod tests;
