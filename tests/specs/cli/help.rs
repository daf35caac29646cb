//! CLI help specs

use crate::prelude::*;

#[test]
fn no_subcommand_prints_help() {
    cli()
        .passes()
        .stdout_has("Usage: vt")
        .stdout_has("up")
        .stdout_has("destroy");
}

#[test]
fn up_help_lists_run_options() {
    let out = cli().args(&["up", "--help"]).passes();
    for flag in [
        "--box",
        "--boxes",
        "--provider",
        "--provisioner",
        "--provision-path",
        "--parallel",
        "--cleanup",
        "--debug",
        "--workdir",
        "--timeout",
        "--retries",
        "--no-box-repair",
    ] {
        assert!(out.stdout().contains(flag), "missing {flag} in:\n{}", out.stdout());
    }
}

#[test]
fn destroy_help_requires_workdir() {
    cli()
        .args(&["destroy", "--help"])
        .passes()
        .stdout_has("--workdir <DIR>");
}
