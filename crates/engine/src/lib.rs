// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt execution engine

mod activity_logger;
pub mod cleanup;
mod descriptor;
mod error;
pub mod log_paths;
pub mod registry;
mod report;
mod runner;
mod scheduler;
pub mod workspace;

pub use activity_logger::TargetLogger;
pub use cleanup::{Cleanup, CleanupReport, WorkspaceCleanup};
pub use descriptor::render_vagrantfile;
pub use error::{CleanupError, PhaseError, WorkspaceError};
pub use report::RunReport;
pub use runner::Runner;
pub use scheduler::Scheduler;
pub use workspace::{RunRoot, Workspace, WorkspaceBuilder, WorkspaceState};
