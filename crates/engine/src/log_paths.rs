// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared path builders for workspace and log files.
//!
//! Used by the runner (writer), cleanup and the CLI (readers) so every
//! part of the tool agrees on the layout:
//!   `<workspace>/logs/<slug>_up.log`
//!   `<workspace>/logs/<slug>_provision.log`
//!   `<workspace>/logs/<slug>_script_output.log`
//!   `<workspace>/logs/destroy.log`
//!   `<workspace>/logs/<slug>.log`
//!   `<run_root>/logs/<workspace_name>/` after cleanup

use std::path::{Path, PathBuf};
use vt_core::Phase;

/// Directory name for logs, both inside a workspace and under the run root.
pub const LOGS_DIR: &str = "logs";

/// Workspace state file name.
pub const STATE_FILE: &str = ".vt-workspace.json";

/// Environment descriptor file name.
pub const DESCRIPTOR_FILE: &str = "Vagrantfile";

/// Build the path to a workspace's log directory.
///
/// Structure: `{workspace}/logs`
pub fn logs_dir(workspace: &Path) -> PathBuf {
    workspace.join(LOGS_DIR)
}

/// Build the path to a phase log for one attempt (1-based).
///
/// Structure: `{logs_dir}/{slug}_{stem}.log`, then `{slug}_{stem}_retry.log`,
/// `{slug}_{stem}_retry2.log`, ... for later attempts. Teardown always
/// writes `{logs_dir}/destroy.log`.
pub fn phase_log_path(logs_dir: &Path, slug: &str, phase: Phase, attempt: u32) -> PathBuf {
    let stem = match phase {
        Phase::BringUp => "up",
        Phase::Provision => "provision",
        Phase::Execute => "script_output",
        Phase::Teardown => return logs_dir.join("destroy.log"),
    };
    let suffix = match attempt {
        0 | 1 => String::new(),
        2 => "_retry".to_string(),
        n => format!("_retry{}", n - 1),
    };
    logs_dir.join(format!("{}_{}{}.log", slug, stem, suffix))
}

/// Build the path to a target's activity log.
///
/// Structure: `{logs_dir}/{slug}.log`
pub fn activity_log_path(logs_dir: &Path, slug: &str) -> PathBuf {
    logs_dir.join(format!("{}.log", slug))
}

/// Build the path to the box repair log.
///
/// Structure: `{logs_dir}/{slug}_box_repair.log`
pub fn box_repair_log_path(logs_dir: &Path, slug: &str) -> PathBuf {
    logs_dir.join(format!("{}_box_repair.log", slug))
}

/// Build the path to a workspace's state file.
pub fn state_file_path(workspace: &Path) -> PathBuf {
    workspace.join(STATE_FILE)
}

/// Where a workspace's logs are kept once the workspace is removed.
///
/// Structure: `{run_root}/logs/{workspace_name}`
pub fn preserved_logs_dir(run_root: &Path, workspace_name: &str) -> PathBuf {
    run_root.join(LOGS_DIR).join(workspace_name)
}

/// Map a log path under `from` to the same file under `to`.
///
/// Paths outside `from` are returned unchanged.
pub fn relocate(path: &Path, from: &Path, to: &Path) -> PathBuf {
    match path.strip_prefix(from) {
        Ok(rest) => to.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
