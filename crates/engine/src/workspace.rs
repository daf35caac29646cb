// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target workspaces and the run root that holds them

use crate::descriptor::render_vagrantfile;
use crate::error::WorkspaceError;
use crate::log_paths::{self, DESCRIPTOR_FILE, LOGS_DIR};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vt_core::{RunConfig, Target};

/// Parent directory of every workspace in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRoot {
    path: PathBuf,
    fixed: bool,
}

impl RunRoot {
    /// Use `workdir` (created if missing), or a fresh `vt-run-*` temp
    /// directory that outlives the process.
    pub fn prepare(workdir: Option<&Path>) -> Result<Self, WorkspaceError> {
        match workdir {
            Some(path) => {
                fs::create_dir_all(path).map_err(|source| WorkspaceError::RunRoot {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Self::fixed(path))
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("vt-run-")
                    .tempdir()
                    .map_err(|source| WorkspaceError::RunRoot {
                        path: std::env::temp_dir(),
                        source,
                    })?;
                Ok(Self::scoped(dir.keep()))
            }
        }
    }

    /// Operator-chosen directory; only empty leftover directories are reused.
    pub fn fixed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fixed: true,
        }
    }

    /// Directory owned by this run; slug collisions get a numeric suffix.
    pub fn scoped(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fixed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }
}

/// Contents of `.vt-workspace.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub target: Target,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    /// Set before the first bring-up attempt; tells cleanup to destroy.
    pub bring_up_started: bool,
}

impl WorkspaceState {
    /// Read the state file of `workspace`; `None` if there is none.
    pub fn load(workspace: &Path) -> io::Result<Option<Self>> {
        let path = log_paths::state_file_path(workspace);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Atomically replace the state file of `workspace`.
    pub fn save(&self, workspace: &Path) -> io::Result<()> {
        let path = log_paths::state_file_path(workspace);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, json.as_bytes())?;
        fs::rename(&tmp_path, &path)
    }
}

/// A prepared directory owned by one target for one run.
#[derive(Debug, Clone)]
pub struct Workspace {
    path: PathBuf,
    state: WorkspaceState,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name; the target slug, possibly with a `-N` suffix.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn logs_dir(&self) -> PathBuf {
        log_paths::logs_dir(&self.path)
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    /// Persist that bring-up is about to start.
    pub fn mark_started(&mut self) -> io::Result<()> {
        let mut state = self.state.clone();
        state.bring_up_started = true;
        state.save(&self.path)?;
        self.state = state;
        Ok(())
    }
}

/// Creates and populates workspaces under a run root.
#[derive(Debug, Clone)]
pub struct WorkspaceBuilder {
    root: RunRoot,
    /// Directories claimed by this builder and its clones.
    claimed: Arc<Mutex<HashSet<PathBuf>>>,
}

impl WorkspaceBuilder {
    pub fn new(root: RunRoot) -> Self {
        Self {
            root,
            claimed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn root(&self) -> &RunRoot {
        &self.root
    }

    /// Create the target's directory and write the state file, the
    /// Vagrantfile, the payload script and the provisioning artifact.
    ///
    /// On a failure after the directory exists, it is left in place and
    /// named by [`WorkspaceError::workspace`].
    pub fn build(&self, target: &Target, config: &RunConfig) -> Result<Workspace, WorkspaceError> {
        let path = self.claim(&target.slug())?;
        let state = WorkspaceState {
            target: target.clone(),
            provider: config.provider.clone(),
            created_at: Utc::now(),
            bring_up_started: false,
        };

        let populate = |file: PathBuf, result: io::Result<()>| {
            result.map_err(|source| WorkspaceError::Populate {
                workspace: path.clone(),
                file,
                source,
            })
        };

        populate(log_paths::state_file_path(&path), state.save(&path))?;

        let descriptor = path.join(DESCRIPTOR_FILE);
        populate(
            descriptor.clone(),
            fs::write(&descriptor, render_vagrantfile(target, config)),
        )?;

        let script = path.join(config.script_name());
        populate(script.clone(), copy_file(&config.script, &script))?;
        populate(script.clone(), make_executable(&script))?;

        if let Some(provisioner) = &config.provisioner {
            let artifact = path.join(config.artifact_name().unwrap_or_default());
            populate(artifact.clone(), copy_file(&provisioner.artifact, &artifact))?;
        }

        let logs = log_paths::logs_dir(&path);
        populate(logs.clone(), fs::create_dir_all(&logs))?;

        tracing::debug!(box_name = %target, workspace = %path.display(), "workspace ready");
        Ok(Workspace { path, state })
    }

    /// Claim a fresh directory for `slug`, suffixing `-2`, `-3`, ... past
    /// names already taken in this run.
    ///
    /// Under a scoped root any existing directory is skipped. Under a fixed
    /// root an empty directory left from an earlier run is reused, and a
    /// non-empty one is a [`WorkspaceError::Collision`].
    fn claim(&self, slug: &str) -> Result<PathBuf, WorkspaceError> {
        let names = std::iter::once(slug.to_string())
            .chain((2..).map(|n| format!("{}-{}", slug, n)))
            .filter(|name| name != LOGS_DIR);

        let mut claimed = self.claimed.lock();
        for name in names {
            let path = self.root.path.join(name);
            if claimed.contains(&path) {
                continue;
            }
            match fs::create_dir(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.root.fixed => {
                    reuse_empty(&path)?;
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(WorkspaceError::Create { path, source }),
            }
            claimed.insert(path.clone());
            return Ok(path);
        }
        Err(WorkspaceError::Collision {
            path: self.root.path.join(slug),
        })
    }
}

/// Take over an existing empty directory by creating its state file
/// exclusively; whoever creates it first owns the directory.
fn reuse_empty(path: &Path) -> Result<(), WorkspaceError> {
    let create_err = |source: io::Error| WorkspaceError::Create {
        path: path.to_path_buf(),
        source,
    };
    let occupied = fs::read_dir(path).map_err(create_err)?.next().is_some();
    if occupied {
        return Err(WorkspaceError::Collision {
            path: path.to_path_buf(),
        });
    }
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(log_paths::state_file_path(path))
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(WorkspaceError::Collision {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(create_err(source)),
    }
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
