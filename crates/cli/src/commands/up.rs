// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vt up <script> --box B | --boxes FILE` - validate a script across boxes

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use tokio_util::sync::CancellationToken;
use vt_adapters::{resolve_binary, TracedVm, VagrantAdapter, VmAdapter};
use vt_core::config::DEFAULT_PROVIDER;
use vt_core::{ConfigError, Provisioner, ProvisionerKind, RunConfig, Target};
use vt_engine::{registry, RunReport, RunRoot, Scheduler};

use crate::exit_error::{self, ExitError};
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct UpArgs {
    /// Payload script to run inside each box
    pub script: PathBuf,

    /// Single box to test (e.g. "debian/bookworm64")
    #[arg(long = "box", value_name = "BOX")]
    pub box_name: Option<String>,

    /// File listing boxes, one per line ('#' starts a comment)
    #[arg(long, value_name = "FILE")]
    pub boxes: Option<PathBuf>,

    /// Provider passed to `vagrant up --provider`
    #[arg(long, default_value = DEFAULT_PROVIDER)]
    pub provider: String,

    /// Provisioner run before the payload script
    #[arg(long, value_enum)]
    pub provisioner: Option<ProvisionerArg>,

    /// Artifact consumed by the provisioner (script or playbook)
    #[arg(long, value_name = "FILE")]
    pub provision_path: Option<PathBuf>,

    /// Maximum number of boxes in flight
    #[arg(short = 'j', long, default_value_t = 1)]
    pub parallel: usize,

    /// Destroy each box and remove its workspace when it finishes
    #[arg(long)]
    pub cleanup: bool,

    /// Verbose logging and `vagrant --debug`
    #[arg(long)]
    pub debug: bool,

    /// Parent directory for workspaces (default: a fresh temp directory)
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Timeout for each vagrant invocation, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Extra attempts for bring-up, provision and execute
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Do not re-add a box and retry after an import error
    #[arg(long)]
    pub no_box_repair: bool,

    /// VM manager binary (default: $VT_VAGRANT_BIN, then vagrant)
    #[arg(long, value_name = "BIN")]
    pub vagrant_bin: Option<String>,

    /// Arguments forwarded to the payload script
    #[arg(last = true, value_name = "ARGS")]
    pub script_args: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProvisionerArg {
    Shell,
    Ansible,
}

impl From<ProvisionerArg> for ProvisionerKind {
    fn from(arg: ProvisionerArg) -> Self {
        match arg {
            ProvisionerArg::Shell => ProvisionerKind::Shell,
            ProvisionerArg::Ansible => ProvisionerKind::Ansible,
        }
    }
}

impl UpArgs {
    /// Build and validate the run configuration; touches nothing but the
    /// input files.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let mut config = RunConfig::new(&self.script);
        config.provider = self.provider.clone();
        config.parallel = self.parallel;
        config.debug = self.debug;
        config.script_args = self.script_args.clone();
        config.provisioner =
            Provisioner::from_parts(self.provisioner.map(Into::into), self.provision_path.clone())?;
        config.cleanup = self.cleanup;
        config.workdir = self.workdir.clone();
        config.timeout = super::phase_timeout(self.timeout);
        config.retries = self.retries;
        config.box_repair = !self.no_box_repair;
        config.validate()
    }

    pub fn targets(&self) -> Result<Vec<Target>, ConfigError> {
        registry::resolve(self.box_name.as_deref(), self.boxes.as_deref())
    }
}

pub async fn handle(args: UpArgs, format: OutputFormat) -> Result<()> {
    let mut config = args.run_config()?;
    let targets = args.targets()?;
    let binary = resolve_binary(args.vagrant_bin.as_deref())?;
    config.vagrant_bin = binary.display().to_string();
    let root = RunRoot::prepare(config.workdir.as_deref())?;

    let adapter = TracedVm::new(VagrantAdapter::new(binary, config.debug));
    let cancel = CancellationToken::new();
    let interrupts = tokio::spawn(forward_interrupts(cancel.clone()));
    let report = execute(adapter, config, root, targets, cancel).await;
    interrupts.abort();

    output::print_run_report(&report, format)?;
    exit_status(&report)
}

pub(crate) async fn execute<V: VmAdapter>(
    adapter: V,
    config: RunConfig,
    root: RunRoot,
    targets: Vec<Target>,
    cancel: CancellationToken,
) -> RunReport {
    Scheduler::new(adapter, Arc::new(config), root)
        .run(targets, cancel)
        .await
}

/// First Ctrl-C cancels the run and lets started boxes tear down; a second
/// one exits immediately.
async fn forward_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::warn!("interrupted, tearing down started boxes (Ctrl-C again to abort)");
    cancel.cancel();
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("aborted; workspaces may be left behind");
        std::process::exit(exit_error::INTERRUPTED);
    }
}

/// 0 when every box succeeded, 130 after an interrupt, 1 otherwise.
pub(crate) fn exit_status(report: &RunReport) -> Result<()> {
    if report.interrupted() {
        return Err(ExitError::silent(exit_error::INTERRUPTED).into());
    }
    if !report.all_succeeded() {
        return Err(ExitError::silent(exit_error::FAILED).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "up_tests.rs"]
mod tests;
