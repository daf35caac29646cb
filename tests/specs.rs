//! Black-box behavior tests for the vt CLI.
//!
//! These tests are black-box: they invoke the `vt` binary against a fake
//! `vagrant` script and verify stdout, stderr, exit codes and the files
//! left on disk.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// up/
#[path = "specs/up/failures.rs"]
mod up_failures;
#[path = "specs/up/run.rs"]
mod up_run;
#[path = "specs/up/targets.rs"]
mod up_targets;

// destroy/
#[path = "specs/destroy/workdir.rs"]
mod destroy_workdir;
