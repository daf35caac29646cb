//! `vt up` partial-failure specs
//!
//! A failing box never affects the others, and every started box is torn
//! down when `--cleanup` is set.

use crate::prelude::*;

#[test]
fn payload_failure_is_isolated() {
    let project = Project::new();
    project.file("boxes.txt", "debian/bookworm64\nubuntu/focal64\n");

    let out = project
        .up(&["--boxes", "boxes.txt", "--parallel", "2", "--cleanup"])
        .fails()
        .stdout_has("debian/bookworm64  succeeded")
        .stdout_has("ubuntu/focal64     execution-failed  execute")
        .stdout_has("1 of 2 boxes succeeded\nfailed:\n")
        .stdout_has("  ubuntu/focal64: execution-failed in execute (log: ");
    assert!(out
        .stdout()
        .contains("logs/ubuntu-focal64/ubuntu-focal64_script_output.log"));

    let logs = project.run_dir().join("logs");
    assert!(logs.join("debian-bookworm64/destroy.log").is_file());
    assert!(logs.join("ubuntu-focal64/destroy.log").is_file());
    let output =
        std::fs::read_to_string(logs.join("ubuntu-focal64/ubuntu-focal64_script_output.log")).unwrap();
    assert!(output.contains("unsupported release: ubuntu/focal64"));
    assert!(project.workspaces().is_empty());
}

#[test]
fn bring_up_failure_skips_later_phases_but_tears_down() {
    let project = Project::new();

    project
        .up(&["--box", "broken/box", "--cleanup"])
        .fails()
        .stdout_has("broken/box  bring-up-failed  bring-up");

    let subcommands: Vec<String> = project
        .vagrant_calls()
        .iter()
        .filter_map(|call| call.split_whitespace().nth(1).map(str::to_string))
        .collect();
    assert_eq!(subcommands, vec!["up", "destroy"]);
}

#[test]
fn retries_recover_a_flaky_bring_up() {
    let project = Project::new();

    project
        .up(&["--box", "flaky/box", "--retries", "1", "--cleanup"])
        .passes()
        .stdout_has("flaky/box  succeeded");

    let logs = project.run_dir().join("logs/flaky-box");
    assert!(logs.join("flaky-box_up.log").is_file());
    assert!(logs.join("flaky-box_up_retry.log").is_file());
}

#[test]
fn no_retries_by_default() {
    let project = Project::new();

    project
        .up(&["--box", "flaky/box", "--cleanup"])
        .fails()
        .stdout_has("bring-up-failed");
}

#[test]
fn box_import_error_triggers_one_repair() {
    let project = Project::new();

    project
        .up(&["--box", "corrupt/box", "--cleanup"])
        .passes()
        .stdout_has("corrupt/box  succeeded");

    let calls = project.vagrant_calls();
    assert!(calls.contains(&"corrupt/box box remove corrupt/box --all --force".to_string()));
    assert!(calls.contains(
        &"corrupt/box box add corrupt/box --provider virtualbox --force".to_string()
    ));
    assert!(project
        .run_dir()
        .join("logs/corrupt-box/corrupt-box_box_repair.log")
        .is_file());
}

#[test]
fn box_repair_can_be_disabled() {
    let project = Project::new();

    project
        .up(&["--box", "corrupt/box", "--no-box-repair", "--cleanup"])
        .fails()
        .stdout_has("bring-up-failed");
    assert!(!project.vagrant_calls().iter().any(|c| c.contains(" box ")));
}

#[test]
fn slow_payload_times_out() {
    let project = Project::new();

    project
        .up(&["--box", "slow/box", "--timeout", "1", "--cleanup"])
        .fails()
        .stdout_has("slow/box  timeout  execute");
}
