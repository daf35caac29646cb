//! `vt destroy` specs
//!
//! Workspaces kept by an earlier run are torn down and removed, with their
//! logs moved under the run directory.

use crate::prelude::*;

#[test]
fn destroys_kept_workspaces() {
    let project = Project::new();
    project.file("boxes.txt", "alpine/edge\ndebian/bookworm64\n");
    project.up(&["--boxes", "boxes.txt"]).passes();
    assert_eq!(project.workspaces().len(), 2);

    let run_dir = project.run_dir().display().to_string();
    project
        .vt()
        .args(&["destroy", "--workdir", &run_dir])
        .passes()
        .stdout_has("WORKSPACE")
        .stdout_has("removed");

    assert!(project.workspaces().is_empty());
    let destroys = project
        .vagrant_calls()
        .iter()
        .filter(|call| call.contains(" destroy -f"))
        .count();
    assert_eq!(destroys, 2);
    assert!(project
        .run_dir()
        .join("logs/alpine-edge/alpine-edge_script_output.log")
        .is_file());
    assert!(project.run_dir().join("logs/alpine-edge/destroy.log").is_file());
}

#[test]
fn second_destroy_is_a_no_op() {
    let project = Project::new();
    project.up(&["--box", "alpine/edge"]).passes();

    let run_dir = project.run_dir().display().to_string();
    project.vt().args(&["destroy", "--workdir", &run_dir]).passes();
    project
        .vt()
        .args(&["destroy", "--workdir", &run_dir])
        .passes()
        .stdout_has("nothing to destroy in");
}

#[test]
fn single_workspace_can_be_destroyed() {
    let project = Project::new();
    project.up(&["--box", "alpine/edge"]).passes();

    let workspace = project.run_dir().join("alpine-edge");
    project
        .vt()
        .args(&["destroy", "--workdir", &workspace.display().to_string()])
        .passes()
        .stdout_has("removed");
    assert!(!workspace.exists());
}

#[test]
fn missing_workdir_is_not_an_error() {
    let project = Project::new();
    project
        .vt()
        .args(&["destroy", "--workdir", "nowhere"])
        .passes()
        .stdout_has("nothing to destroy in nowhere");
    assert!(project.vagrant_calls().is_empty());
}

#[test]
fn json_lists_each_workspace() {
    let project = Project::new();
    project.up(&["--box", "alpine/edge"]).passes();

    let run_dir = project.run_dir().display().to_string();
    let out = project
        .vt()
        .args(&["-o", "json", "destroy", "--workdir", &run_dir])
        .passes();
    let json = out.json();
    assert_eq!(json[0]["status"], "removed");
    assert!(json[0]["workspace"]
        .as_str()
        .unwrap()
        .ends_with("alpine-edge"));
}
