// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake VM adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{VmAdapter, VmError, VmOutput};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vt_core::Phase;

/// Recorded VM manager call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmCall {
    pub phase: Phase,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Duration,
}

impl VmCall {
    /// Workspace directory name (the target slug).
    pub fn workspace_name(&self) -> String {
        dir_name(&self.workdir)
    }

    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Scripted reply to one call
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Exit { code: i32, output: String },
    /// Reply with [`VmError::Timeout`] as if the timeout had elapsed.
    Timeout,
    /// Reply with [`VmError::Spawn`].
    SpawnError,
    /// Never reply; only cancellation of the caller ends the call.
    Hang,
    /// Panic inside the adapter, to exercise task isolation.
    Panic,
}

impl FakeResponse {
    pub fn exit(code: i32) -> Self {
        FakeResponse::Exit {
            code,
            output: format!("exited with {}\n", code),
        }
    }

    pub fn exit_with_output(code: i32, output: &str) -> Self {
        FakeResponse::Exit {
            code,
            output: output.to_string(),
        }
    }
}

#[derive(Default)]
struct FakeVmState {
    /// Replies keyed by (workspace name, subcommand), consumed in order.
    responses: HashMap<(String, String), VecDeque<FakeResponse>>,
    calls: Vec<VmCall>,
    running: HashSet<String>,
    in_flight: usize,
    max_in_flight: usize,
    delay: Duration,
}

/// Fake VM adapter for testing
///
/// Unscripted calls succeed. Replies are scripted per workspace directory
/// name and subcommand (`up`, `provision`, `ssh`, `destroy`, `box`).
#[derive(Clone, Default)]
pub struct FakeVmAdapter {
    inner: Arc<Mutex<FakeVmState>>,
}

impl FakeVmAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for `subcommand` in workspace `name`.
    pub fn script(&self, name: &str, subcommand: &str, replies: Vec<FakeResponse>) {
        self.inner
            .lock()
            .responses
            .entry((name.to_string(), subcommand.to_string()))
            .or_default()
            .extend(replies);
    }

    /// Queue one reply for the subcommand that implements `phase`.
    pub fn respond(&self, name: &str, phase: Phase, reply: FakeResponse) {
        self.script(name, subcommand_for(phase), vec![reply]);
    }

    /// Make the next invocation of `phase` in workspace `name` exit with `code`.
    pub fn fail(&self, name: &str, phase: Phase, code: i32) {
        self.respond(name, phase, FakeResponse::exit(code));
    }

    /// Sleep this long inside every call (use with paused tokio time).
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = delay;
    }

    pub fn calls(&self) -> Vec<VmCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls made for one workspace, in order.
    pub fn calls_for(&self, name: &str) -> Vec<VmCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.workspace_name() == name)
            .collect()
    }

    /// Phases invoked for one workspace, in order.
    pub fn phases_for(&self, name: &str) -> Vec<Phase> {
        self.calls_for(name).iter().map(|c| c.phase).collect()
    }

    /// Workspaces whose environment is up and not destroyed.
    pub fn running_environments(&self) -> HashSet<String> {
        self.inner.lock().running.clone()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().max_in_flight
    }

    fn begin(&self, call: VmCall) -> (Option<FakeResponse>, Duration) {
        let mut inner = self.inner.lock();
        let key = (call.workspace_name(), call.subcommand().to_string());
        let reply = inner.responses.get_mut(&key).and_then(VecDeque::pop_front);
        inner.calls.push(call);
        inner.in_flight += 1;
        inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
        (reply, inner.delay)
    }

    fn finish(&self, name: &str, subcommand: &str, success: bool) {
        let mut inner = self.inner.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        match subcommand {
            "up" if success => {
                inner.running.insert(name.to_string());
            }
            "destroy" if success => {
                inner.running.remove(name);
            }
            _ => {}
        }
    }
}

/// Releases the in-flight slot even when the call future is dropped.
struct InFlight<'a> {
    fake: &'a FakeVmAdapter,
    name: String,
    subcommand: String,
    success: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.fake.finish(&self.name, &self.subcommand, self.success);
    }
}

#[async_trait]
impl VmAdapter for FakeVmAdapter {
    #[allow(clippy::panic)]
    async fn run(
        &self,
        phase: Phase,
        args: &[String],
        workdir: &Path,
        timeout: Duration,
    ) -> Result<VmOutput, VmError> {
        let call = VmCall {
            phase,
            args: args.to_vec(),
            workdir: workdir.to_path_buf(),
            timeout,
        };
        let description = format!("vagrant {}", call.subcommand());
        let mut guard = InFlight {
            fake: self,
            name: call.workspace_name(),
            subcommand: call.subcommand().to_string(),
            success: false,
        };
        let (reply, delay) = self.begin(call);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = reply.unwrap_or(FakeResponse::Exit {
            code: 0,
            output: format!("ok: {}\n", args.join(" ")),
        });
        match reply {
            FakeResponse::Exit { code, output } => {
                guard.success = code == 0;
                Ok(VmOutput {
                    exit_code: Some(code),
                    output,
                })
            }
            FakeResponse::Timeout => Err(VmError::Timeout {
                description,
                after: timeout,
                output: "partial output\n".to_string(),
            }),
            FakeResponse::SpawnError => Err(VmError::Spawn {
                description,
                message: "No such file or directory (os error 2)".to_string(),
            }),
            FakeResponse::Hang => std::future::pending().await,
            FakeResponse::Panic => panic!("fake vm adapter panicked in {}", description),
        }
    }
}

fn subcommand_for(phase: Phase) -> &'static str {
    match phase {
        Phase::BringUp => "up",
        Phase::Provision => "provision",
        Phase::Execute => "ssh",
        Phase::Teardown => "destroy",
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
