// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Target;

#[yare::parameterized(
    plain           = { "centos7",            "centos7" },
    namespaced      = { "ubuntu/focal64",     "ubuntu-focal64" },
    dotted_version  = { "bento/rockylinux-9.3", "bento-rockylinux-9.3" },
    spaces          = { "my box",             "my-box" },
    leading_dot     = { ".hidden",            "-hidden" },
    url_like        = { "https://x/y.box",    "https---x-y.box" },
)]
fn slug(input: &str, expected: &str) {
    assert_eq!(Target::new(input).slug(), expected);
}

#[test]
fn slug_is_never_a_path() {
    let slug = Target::new("../../etc/passwd").slug();
    assert!(!slug.contains('/'));
    assert!(!slug.starts_with('.'));
}

#[test]
fn displays_and_compares_as_the_box_name() {
    let target = Target::from("ubuntu/jammy64");
    assert_eq!(target, "ubuntu/jammy64");
    assert_eq!(target.to_string(), "ubuntu/jammy64");
    assert_eq!(target.as_str(), "ubuntu/jammy64");
}

#[test]
fn serializes_as_a_plain_string() {
    let target = Target::new("centos/7");
    assert_eq!(serde_json::to_string(&target).unwrap(), "\"centos/7\"");
    let back: Target = serde_json::from_str("\"centos/7\"").unwrap();
    assert_eq!(back, target);
}
