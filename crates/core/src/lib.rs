// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt-core: domain types for the vt box validation tool

pub mod config;
pub mod lifecycle;
pub mod phase;
pub mod result;
pub mod target;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ConfigError, Provisioner, ProvisionerKind, RunConfig};
pub use lifecycle::{Lifecycle, LifecycleState, PhaseStatus, TransitionError};
pub use phase::{Outcome, Phase, PhaseRecord};
pub use result::RunResult;
pub use target::Target;
pub use time_fmt::{epoch_ms_now, format_duration_ms};
