//! CLI error handling specs
//!
//! Configuration errors stop the run before any workspace exists.

use crate::prelude::*;

#[test]
fn missing_script_is_reported() {
    let project = Project::new();
    project
        .vt()
        .args(&["up", "missing.sh", "--box", "debian/bookworm64"])
        .fails()
        .stderr_has("Error: script not found: missing.sh");
    assert!(project.vagrant_calls().is_empty());
}

#[test]
fn a_target_source_is_required() {
    let project = Project::new();
    project
        .up(&[])
        .fails()
        .stderr_has("Error: specify either --box or --boxes");
    assert!(!project.run_dir().exists());
}

#[test]
fn box_and_boxes_are_exclusive() {
    let project = Project::new();
    project.file("boxes.txt", "debian/bookworm64\n");
    project
        .up(&["--box", "alpine/edge", "--boxes", "boxes.txt"])
        .fails()
        .stderr_has("Error: --box and --boxes are mutually exclusive");
}

#[test]
fn empty_box_list_is_reported() {
    let project = Project::new();
    project.file("boxes.txt", "# nothing yet\n\n");
    project
        .up(&["--boxes", "boxes.txt"])
        .fails()
        .stderr_has("Error: no boxes found in boxes.txt");
}

#[test]
fn provisioner_needs_an_artifact() {
    let project = Project::new();
    project
        .up(&["--box", "alpine/edge", "--provisioner", "ansible"])
        .fails()
        .stderr_has("Error: --provisioner ansible requires --provision-path");
}

#[test]
fn missing_vagrant_is_reported() {
    let project = Project::new();
    project
        .vt()
        .env("VT_VAGRANT_BIN", "/nonexistent/vagrant")
        .args(&["up", "install.sh", "--box", "alpine/edge"])
        .fails()
        .stderr_has("Error: /nonexistent/vagrant not found on PATH");
}

#[test]
fn zero_parallelism_is_rejected() {
    let project = Project::new();
    project
        .up(&["--box", "alpine/edge", "--parallel", "0"])
        .fails()
        .stderr_has("Error: parallelism must be at least 1");
}
