// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target lifecycle state machine.
//!
//! The runner never picks a phase on its own: it calls [`Lifecycle::start`]
//! to get the first phase, then reports each phase's status through
//! [`Lifecycle::complete`], which hands back the next phase (or `None` once a
//! terminal state is reached). Executing a payload before bring-up, or
//! provisioning when no provisioner is configured, therefore cannot be
//! expressed.
//!
//! ```text
//! Pending -> BringingUp -> [Provisioning] -> Executing -> Succeeded
//!                 \              \               \
//!                  +--------------+---------------+--> Failed
//! Succeeded | Failed --(environment started)--> TornDown
//! ```

use crate::phase::{Outcome, Phase};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How a single phase invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    Passed,
    Failed,
    TimedOut,
    Interrupted,
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseStatus::Passed => write!(f, "passed"),
            PhaseStatus::Failed => write!(f, "failed"),
            PhaseStatus::TimedOut => write!(f, "timed out"),
            PhaseStatus::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    BringingUp,
    Provisioning,
    Executing,
    Succeeded,
    Failed {
        outcome: Outcome,
        phase: Phase,
    },
    TornDown {
        outcome: Outcome,
        failed_phase: Option<Phase>,
    },
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "pending",
            LifecycleState::BringingUp => "bringing-up",
            LifecycleState::Provisioning => "provisioning",
            LifecycleState::Executing => "executing",
            LifecycleState::Succeeded => "succeeded",
            LifecycleState::Failed { .. } => "failed",
            LifecycleState::TornDown { .. } => "torn-down",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Succeeded | LifecycleState::Failed { .. } | LifecycleState::TornDown { .. }
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("lifecycle already started (state: {0})")]
    AlreadyStarted(&'static str),
    #[error("no phase is running (state: {0})")]
    NoActivePhase(&'static str),
    #[error("cannot tear down from state {0}")]
    CannotTearDown(&'static str),
}

/// State machine for one target.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    provision: bool,
    environment_started: bool,
}

impl Lifecycle {
    /// `provision` selects whether the provisioning phase is part of the flow.
    pub fn new(provision: bool) -> Self {
        Self {
            state: LifecycleState::Pending,
            provision,
            environment_started: false,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Whether bring-up was ever attempted, i.e. whether the VM manager may
    /// hold an environment that needs destroying.
    pub fn environment_started(&self) -> bool {
        self.environment_started
    }

    /// Phase currently running, if any.
    pub fn active_phase(&self) -> Option<Phase> {
        match self.state {
            LifecycleState::BringingUp => Some(Phase::BringUp),
            LifecycleState::Provisioning => Some(Phase::Provision),
            LifecycleState::Executing => Some(Phase::Execute),
            _ => None,
        }
    }

    /// `Pending -> BringingUp`.
    pub fn start(&mut self) -> Result<Phase, TransitionError> {
        if self.state != LifecycleState::Pending {
            return Err(TransitionError::AlreadyStarted(self.state.name()));
        }
        self.state = LifecycleState::BringingUp;
        self.environment_started = true;
        Ok(Phase::BringUp)
    }

    /// Record the status of the active phase and advance.
    ///
    /// Returns the next phase to run, or `None` when the state is terminal.
    pub fn complete(&mut self, status: PhaseStatus) -> Result<Option<Phase>, TransitionError> {
        let Some(phase) = self.active_phase() else {
            return Err(TransitionError::NoActivePhase(self.state.name()));
        };

        let failure = match status {
            PhaseStatus::Passed => None,
            PhaseStatus::TimedOut => Some(Outcome::Timeout),
            PhaseStatus::Interrupted => Some(Outcome::Interrupted),
            PhaseStatus::Failed => phase.failure_outcome(),
        };
        if let Some(outcome) = failure {
            self.state = LifecycleState::Failed { outcome, phase };
            return Ok(None);
        }

        let (next_state, next_phase) = match phase {
            Phase::BringUp if self.provision => (LifecycleState::Provisioning, Some(Phase::Provision)),
            Phase::BringUp | Phase::Provision => (LifecycleState::Executing, Some(Phase::Execute)),
            Phase::Execute | Phase::Teardown => (LifecycleState::Succeeded, None),
        };
        self.state = next_state;
        Ok(next_phase)
    }

    /// True once the run reached a terminal state with an environment that
    /// has not been torn down yet.
    pub fn needs_teardown(&self) -> bool {
        self.environment_started
            && matches!(
                self.state,
                LifecycleState::Succeeded | LifecycleState::Failed { .. }
            )
    }

    /// `Succeeded | Failed -> TornDown`, preserving the outcome.
    pub fn tear_down(&mut self) -> Result<(), TransitionError> {
        if !self.needs_teardown() {
            return Err(TransitionError::CannotTearDown(self.state.name()));
        }
        let outcome = self.outcome().unwrap_or(Outcome::Succeeded);
        let failed_phase = self.failed_phase();
        self.state = LifecycleState::TornDown {
            outcome,
            failed_phase,
        };
        Ok(())
    }

    /// Outcome, once terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            LifecycleState::Succeeded => Some(Outcome::Succeeded),
            LifecycleState::Failed { outcome, .. } | LifecycleState::TornDown { outcome, .. } => {
                Some(*outcome)
            }
            _ => None,
        }
    }

    /// Phase that decided a failed outcome.
    pub fn failed_phase(&self) -> Option<Phase> {
        match &self.state {
            LifecycleState::Failed { phase, .. } => Some(*phase),
            LifecycleState::TornDown { failed_phase, .. } => *failed_phase,
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
