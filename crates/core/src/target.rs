// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A box image under test, e.g. `debian/bookworm64`.
///
/// Targets are resolved once per run by the registry and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe form of the identifier.
    ///
    /// Used for workspace directory names and log file names, so
    /// `ubuntu/focal64` becomes `ubuntu-focal64`. Any character outside
    /// `[A-Za-z0-9._-]` is replaced with `-`, and a leading dot is
    /// replaced so the result is never a hidden file.
    pub fn slug(&self) -> String {
        let mut slug: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        if slug.starts_with('.') {
            slug.replace_range(..1, "-");
        }
        slug
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<&str> for Target {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
