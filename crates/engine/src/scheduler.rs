// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded worker pool over targets

use crate::report::RunReport;
use crate::runner::Runner;
use crate::workspace::{RunRoot, WorkspaceBuilder};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use vt_adapters::VmAdapter;
use vt_core::{Outcome, RunConfig, RunResult, Target};

/// Runs every target through a [`Runner`] with at most `parallel` in flight.
pub struct Scheduler<V> {
    adapter: V,
    config: Arc<RunConfig>,
    root: RunRoot,
}

impl<V: VmAdapter> Scheduler<V> {
    pub fn new(adapter: V, config: Arc<RunConfig>, root: RunRoot) -> Self {
        Self {
            adapter,
            config,
            root,
        }
    }

    /// Run all targets and collect one result per target, in input order.
    ///
    /// After `cancel` fires no new target starts; in-flight targets are
    /// interrupted and still cleaned up, and unstarted ones are recorded
    /// as [`Outcome::Interrupted`] without a workspace.
    pub async fn run(&self, targets: Vec<Target>, cancel: CancellationToken) -> RunReport {
        let total = targets.len();
        let workers = self.config.parallel.max(1).min(total);
        tracing::info!(
            targets = total,
            workers,
            run_root = %self.root.path().display(),
            "starting run"
        );

        let runner = Runner::new(
            self.adapter.clone(),
            Arc::clone(&self.config),
            WorkspaceBuilder::new(self.root.clone()),
            cancel.clone(),
        );
        let queue: Arc<Mutex<VecDeque<(usize, Target)>>> =
            Arc::new(Mutex::new(targets.iter().cloned().enumerate().collect()));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, RunResult)>();

        let mut pool = JoinSet::new();
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let runner = runner.clone();
            let cancel = cancel.clone();
            pool.spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let Some((index, target)) = queue.lock().pop_front() else {
                        break;
                    };
                    tracing::debug!(worker, index, box_name = %target, "picked up target");
                    let result = run_isolated(&runner, target).await;
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        // Single writer: only this loop touches the result slots.
        let mut slots: Vec<Option<RunResult>> = vec![None; total];
        while let Some((index, result)) = rx.recv().await {
            tracing::info!(
                box_name = %result.target,
                outcome = result.outcome.as_str(),
                "target recorded"
            );
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "scheduler worker failed");
            }
        }

        let results = slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    if cancel.is_cancelled() {
                        RunResult::without_phases(target, Outcome::Interrupted, "not started")
                    } else {
                        RunResult::without_phases(target, Outcome::InternalError, "no result recorded")
                    }
                })
            })
            .collect();
        RunReport::new(self.root.path().to_path_buf(), results)
    }
}

/// Run one target on its own task so a panic costs only that target.
async fn run_isolated<V: VmAdapter>(runner: &Runner<V>, target: Target) -> RunResult {
    let task = {
        let runner = runner.clone();
        let target = target.clone();
        tokio::spawn(async move { runner.run(target).await })
    };
    match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(box_name = %target, error = %e, "runner crashed");
            RunResult::without_phases(target, Outcome::InternalError, format!("runner crashed: {}", e))
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
