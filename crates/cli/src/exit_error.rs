// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes carried through `anyhow`.

use thiserror::Error;

/// Exit code when any target failed.
pub const FAILED: i32 = 1;

/// Exit code after an operator interrupt (128 + SIGINT).
pub const INTERRUPTED: i32 = 130;

/// Terminate with `code`; an empty message prints nothing.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Exit with `code` after output has already been printed.
    pub fn silent(code: i32) -> Self {
        Self::new(code, String::new())
    }
}
