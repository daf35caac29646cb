// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vagrantfile rendering

use vt_core::{ProvisionerKind, RunConfig, Target};

/// Render the environment descriptor for one target.
///
/// The workspace is synced to `/vagrant`, so the payload script and the
/// provisioning artifact are referenced by file name only.
pub fn render_vagrantfile(target: &Target, config: &RunConfig) -> String {
    let mut lines = vec![
        r#"Vagrant.configure("2") do |config|"#.to_string(),
        format!("  config.vm.box = {}", ruby_str(target.as_str())),
        format!("  config.vm.provider {}", ruby_str(&config.provider)),
        r#"  config.vm.synced_folder ".", "/vagrant", disabled: false"#.to_string(),
    ];

    if let (Some(provisioner), Some(artifact)) = (&config.provisioner, config.artifact_name()) {
        match provisioner.kind {
            ProvisionerKind::Shell => lines.push(format!(
                r#"  config.vm.provision "shell", privileged: true, path: {}, args: {}"#,
                ruby_str(&artifact),
                ruby_array(&config.script_args)
            )),
            ProvisionerKind::Ansible => lines.extend([
                r#"  config.vm.provision "ansible" do |ansible|"#.to_string(),
                "    ansible.become = true".to_string(),
                format!("    ansible.playbook = {}", ruby_str(&artifact)),
                "  end".to_string(),
            ]),
        }
    }

    lines.push("end".to_string());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Ruby double-quoted string literal with interpolation disabled.
fn ruby_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '"' => out.push_str("\\\""),
            '#' => out.push_str(r"\#"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn ruby_array(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| ruby_str(v)).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
