// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.
#![allow(clippy::expect_used)]

use crate::config::{Provisioner, ProvisionerKind, RunConfig};
use crate::target::Target;
use std::path::Path;

pub const PAYLOAD_SCRIPT: &str = "#!/usr/bin/env bash\nset -euo pipefail\necho payload\n";

/// Write a payload script into `dir` and return a config pointing at it.
///
/// The config is already validated and uses a short timeout so tests that
/// rely on the fake adapter never wait on defaults.
pub fn config_in(dir: &Path) -> RunConfig {
    let script = dir.join("install.sh");
    std::fs::write(&script, PAYLOAD_SCRIPT).expect("write payload script");
    let mut config = RunConfig::new(script);
    config.timeout = std::time::Duration::from_secs(5);
    config
}

/// Like [`config_in`], with a shell provisioner artifact next to the script.
pub fn config_with_provisioner(dir: &Path) -> RunConfig {
    let artifact = dir.join("bootstrap.sh");
    std::fs::write(&artifact, "#!/bin/sh\ntrue\n").expect("write provision artifact");
    let mut config = config_in(dir);
    config.provisioner = Some(Provisioner {
        kind: ProvisionerKind::Shell,
        artifact,
    });
    config
}

pub fn targets(names: &[&str]) -> Vec<Target> {
    names.iter().map(|n| Target::new(*n)).collect()
}
