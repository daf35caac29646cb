// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::vm::{VmAdapter, VmError, VmOutput};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::Instrument;
use vt_core::Phase;

/// Wrapper that adds tracing to any VmAdapter
#[derive(Clone)]
pub struct TracedVm<V> {
    inner: V,
}

impl<V> TracedVm<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }
}

#[async_trait]
impl<V: VmAdapter> VmAdapter for TracedVm<V> {
    async fn run(
        &self,
        phase: Phase,
        args: &[String],
        workdir: &Path,
        timeout: Duration,
    ) -> Result<VmOutput, VmError> {
        let subcommand = args.first().map(String::as_str).unwrap_or("");
        async {
            tracing::debug!(args = ?args, timeout_secs = timeout.as_secs(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.run(phase, args, workdir, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(out) if out.success() => tracing::info!(elapsed_ms, "vm command finished"),
                Ok(out) => tracing::warn!(
                    elapsed_ms,
                    exit_code = ?out.exit_code,
                    "vm command exited non-zero"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "vm command failed"),
            }
            result
        }
        .instrument(tracing::info_span!(
            "vm.run",
            phase = phase.as_str(),
            subcommand,
            cwd = %workdir.display()
        ))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
