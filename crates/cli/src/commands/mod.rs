// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod destroy;
pub mod up;

use std::time::Duration;

use vt_core::config::DEFAULT_PHASE_TIMEOUT;

/// Per-invocation timeout: `--timeout`, then `VT_TIMEOUT_SECS`, then the default.
pub(crate) fn phase_timeout(secs: Option<u64>) -> Duration {
    secs.map(Duration::from_secs)
        .or_else(crate::env::timeout_secs)
        .unwrap_or(DEFAULT_PHASE_TIMEOUT)
}
