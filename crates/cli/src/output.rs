// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};

use clap::ValueEnum;
use vt_core::format_duration_ms;
use vt_engine::RunReport;

use crate::table::{Column, Table};

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a run report to stdout in the requested format.
pub fn print_run_report(report: &RunReport, format: OutputFormat) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => write_run_report(report, crate::color::should_colorize(), &mut out)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(report)?)?,
    }
    Ok(())
}

/// One row per target in input order, then the summary.
///
/// When workspaces were kept, a final line names the run root so they
/// can be removed with `vt destroy`.
pub fn write_run_report(
    report: &RunReport,
    colorize: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut table = Table::with_color(
        vec![
            Column::left("BOX"),
            Column::status("OUTCOME"),
            Column::left("PHASE"),
            Column::right("ELAPSED"),
            Column::muted("LOG"),
        ],
        colorize,
    );
    for result in &report.results {
        let elapsed = if result.phases.is_empty() {
            "-".to_string()
        } else {
            format_duration_ms(result.elapsed_ms())
        };
        table.row(vec![
            result.target.to_string(),
            result.outcome.to_string(),
            result
                .failed_phase
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            elapsed,
            result
                .primary_log()
                .map_or_else(|| "-".to_string(), |p| p.display().to_string()),
        ]);
    }
    table.render(out);
    writeln!(out)?;
    write!(out, "{}", report.summary())?;

    if report.results.iter().any(|r| r.workspace.is_some()) {
        let root = report.run_root().display();
        writeln!(out, "workspaces kept in {root}; remove with: vt destroy --workdir {root}")?;
    }
    Ok(())
}
