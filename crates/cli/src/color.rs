// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

pub mod codes {
    /// Section headers: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;

    #[cfg(test)]
    pub const HEADER_START: &str = "\x1b[38;5;74m";
    #[cfg(test)]
    pub const RESET: &str = "\x1b[0m";
}

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

/// Apply header color (steel blue) unconditionally (caller decides whether to use this).
pub(crate) fn apply_header(text: &str) -> String {
    format!("{}{}{}", fg256(codes::HEADER), text, RESET)
}

/// Apply muted color unconditionally (caller decides whether to use this).
pub(crate) fn apply_muted(text: &str) -> String {
    format!("{}{}{}", fg256(codes::MUTED), text, RESET)
}

/// Colorize an outcome or cleanup status unconditionally.
///
/// - Green: succeeded, removed
/// - Yellow: interrupted, timeout, already-clean
/// - Red: any `*-failed` outcome, internal-error
///
/// Matching ignores surrounding padding.
pub(crate) fn apply_status(text: &str) -> String {
    let word = text.trim();
    let code = match word {
        "succeeded" | "removed" => GREEN,
        "interrupted" | "timeout" | "already-clean" => YELLOW,
        "internal-error" => RED,
        w if w.ends_with("failed") => RED,
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
