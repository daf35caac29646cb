//! Target selection specs

use crate::prelude::*;

#[test]
fn duplicate_boxes_run_once() {
    let project = Project::new();
    project.file("boxes.txt", "alpine/edge\nalpine/edge\ndebian/bookworm64\n");

    let out = project
        .up(&["--boxes", "boxes.txt", "--cleanup", "-o", "json"])
        .passes();

    let json = out.json();
    let targets: Vec<&str> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["target"].as_str().unwrap())
        .collect();
    assert_eq!(targets, vec!["alpine/edge", "debian/bookworm64"]);
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let project = Project::new();
    project.file(
        "boxes.txt",
        "# supported releases\n\n  debian/bookworm64  \n# alpine/edge\n",
    );

    project
        .up(&["--boxes", "boxes.txt", "--cleanup"])
        .passes()
        .stdout_has("1 of 1 boxes succeeded")
        .stdout_lacks("alpine/edge");
}

#[test]
fn each_box_gets_its_own_workspace() {
    let project = Project::new();
    project.file("boxes.txt", "alpine/edge\ndebian/bookworm64\n");

    project.up(&["--boxes", "boxes.txt"]).passes();

    assert_eq!(project.workspaces(), vec!["alpine-edge", "debian-bookworm64"]);
    let vagrantfile =
        std::fs::read_to_string(project.run_dir().join("debian-bookworm64/Vagrantfile")).unwrap();
    assert!(vagrantfile.contains(r#"config.vm.box = "debian/bookworm64""#));
    assert!(project.run_dir().join("alpine-edge/install.sh").is_file());
}
