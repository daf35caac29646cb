//! `vt up` happy-path specs

use crate::prelude::*;

#[test]
fn two_boxes_succeed() {
    let project = Project::new();
    project.file("boxes.txt", "debian/bookworm64\nalpine/edge\n");

    project
        .up(&["--boxes", "boxes.txt", "--parallel", "2", "--cleanup"])
        .passes()
        .stdout_has("debian/bookworm64  succeeded")
        .stdout_has("alpine/edge        succeeded")
        .stdout_has("2 of 2 boxes succeeded\n")
        .stdout_lacks("failed:");

    assert!(project.workspaces().is_empty());
    let logs = project.run_dir().join("logs/debian-bookworm64");
    let output = std::fs::read_to_string(logs.join("debian-bookworm64_script_output.log")).unwrap();
    assert!(output.contains("installed on debian/bookworm64"), "got: {output}");
    assert!(logs.join("debian-bookworm64_up.log").is_file());
    assert!(logs.join("destroy.log").is_file());
    assert!(logs.join("debian-bookworm64.log").is_file());
}

#[test]
fn lifecycle_calls_in_order() {
    let project = Project::new();

    project.up(&["--box", "alpine/edge", "--cleanup"]).passes();

    let calls = project.vagrant_calls();
    assert_eq!(calls.len(), 3, "calls: {calls:?}");
    assert!(calls[0].starts_with("alpine/edge up --provider virtualbox"));
    assert!(calls[1].starts_with("alpine/edge ssh -c sudo bash /vagrant/install.sh"));
    assert!(calls[2].starts_with("alpine/edge destroy -f"));
}

#[test]
fn script_arguments_are_forwarded() {
    let project = Project::new();

    project
        .up(&["--box", "alpine/edge", "--cleanup", "--", "--mode", "full install"])
        .passes();

    let output = std::fs::read_to_string(
        project
            .run_dir()
            .join("logs/alpine-edge/alpine-edge_script_output.log"),
    )
    .unwrap();
    assert!(output.contains("with args: --mode full install"), "got: {output}");
}

#[test]
fn shell_provisioner_runs_before_the_script() {
    let project = Project::new();
    project.file("bootstrap.sh", "#!/bin/sh\necho bootstrapped\n");

    project
        .up(&[
            "--box",
            "alpine/edge",
            "--provisioner",
            "shell",
            "--provision-path",
            "bootstrap.sh",
        ])
        .passes();

    let workspace = project.run_dir().join("alpine-edge");
    let vagrantfile = std::fs::read_to_string(workspace.join("Vagrantfile")).unwrap();
    assert!(vagrantfile.contains(r#"config.vm.provision "shell", privileged: true, path: "bootstrap.sh""#));
    assert!(workspace.join("bootstrap.sh").is_file());
    assert!(workspace.join("logs/alpine-edge_provision.log").is_file());

    let subcommands: Vec<String> = project
        .vagrant_calls()
        .iter()
        .filter_map(|call| call.split_whitespace().nth(1).map(str::to_string))
        .collect();
    assert_eq!(subcommands, vec!["up", "provision", "ssh"]);
}

#[test]
fn json_report() {
    let project = Project::new();

    let out = project
        .up(&["--box", "alpine/edge", "--cleanup", "-o", "json"])
        .passes();

    let json = out.json();
    assert_eq!(json["results"][0]["target"], "alpine/edge");
    assert_eq!(json["results"][0]["outcome"], "succeeded");
    let phases: Vec<&str> = json["results"][0]["phases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["phase"].as_str().unwrap())
        .collect();
    assert_eq!(phases, vec!["bring-up", "execute", "teardown"]);
}

#[test]
fn without_cleanup_workspaces_are_kept() {
    let project = Project::new();

    project
        .up(&["--box", "alpine/edge"])
        .passes()
        .stdout_has("workspaces kept in")
        .stdout_has("vt destroy --workdir");

    assert_eq!(project.workspaces(), vec!["alpine-edge"]);
    assert!(project.run_dir().join("alpine-edge/.fake-running").exists());
}
