// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target registry: the ordered, de-duplicated set of boxes for a run.

use std::collections::HashSet;
use std::path::Path;
use vt_core::{ConfigError, Target};

/// Resolve targets from exactly one source: a single box name or a list file.
///
/// List files hold one box per line. Lines are trimmed, blank lines and
/// `#` comments are skipped, and duplicates collapse to their first
/// occurrence.
pub fn resolve(single: Option<&str>, list_file: Option<&Path>) -> Result<Vec<Target>, ConfigError> {
    match (single, list_file) {
        (Some(_), Some(_)) => Err(ConfigError::ConflictingTargetSources),
        (None, None) => Err(ConfigError::NoTargetSource),
        (Some(name), None) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyTarget);
            }
            Ok(vec![Target::new(name)])
        }
        (None, Some(path)) => {
            let content =
                std::fs::read_to_string(path).map_err(|source| ConfigError::TargetListUnreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
            let targets = parse_list(&content);
            if targets.is_empty() {
                return Err(ConfigError::NoTargets(path.to_path_buf()));
            }
            Ok(targets)
        }
    }
}

/// Parse list file content into targets, preserving first-occurrence order.
pub fn parse_list(content: &str) -> Vec<Target> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(Target::new)
        .collect()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
