// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

/// Value of `VAGRANT_LOG` forced for child processes in debug mode.
pub const DEBUG_VAGRANT_LOG: &str = "debug";

/// Override for the VM manager binary (`VT_VAGRANT_BIN`).
pub fn vagrant_bin() -> Option<String> {
    std::env::var("VT_VAGRANT_BIN")
        .ok()
        .filter(|s| !s.trim().is_empty())
}
