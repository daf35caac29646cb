// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::time::Duration;

// --- Color ---

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}

// --- Timeouts ---

/// Per-invocation timeout override (`VT_TIMEOUT_SECS`); zero is ignored.
pub fn timeout_secs() -> Option<Duration> {
    std::env::var("VT_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
