// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::PhaseStatus;

fn record(phase: Phase, start: u64, end: u64, status: PhaseStatus) -> PhaseRecord {
    PhaseRecord {
        phase,
        started_at_ms: start,
        finished_at_ms: end,
        status,
        exit_code: Some(if status == PhaseStatus::Passed { 0 } else { 1 }),
        attempts: 1,
        log_path: PathBuf::from(format!("/ws/logs/{}.log", phase)),
        note: None,
    }
}

fn failed_execution() -> RunResult {
    RunResult {
        target: Target::new("ubuntu/focal64"),
        outcome: Outcome::ExecutionFailed,
        failed_phase: Some(Phase::Execute),
        reason: Some("execute exited with code 1".to_string()),
        phases: vec![
            record(Phase::BringUp, 1_000, 31_000, PhaseStatus::Passed),
            record(Phase::Execute, 31_000, 35_000, PhaseStatus::Failed),
            record(Phase::Teardown, 35_000, 41_000, PhaseStatus::Passed),
        ],
        workspace: Some(PathBuf::from("/ws")),
        logs_dir: Some(PathBuf::from("/ws/logs")),
        notes: Vec::new(),
    }
}

#[test]
fn primary_log_points_at_failing_phase() {
    let result = failed_execution();
    assert_eq!(
        result.primary_log(),
        Some(Path::new("/ws/logs/execute.log"))
    );
}

#[test]
fn elapsed_spans_all_phases() {
    assert_eq!(failed_execution().elapsed_ms(), 40_000);
}

#[test]
fn without_phases_has_no_log_and_no_time() {
    let result = RunResult::without_phases(
        Target::new("a"),
        Outcome::Interrupted,
        "not started",
    );
    assert!(!result.is_success());
    assert_eq!(result.primary_log(), None);
    assert_eq!(result.elapsed_ms(), 0);
}

#[test]
fn serializes_outcome_in_kebab_case() {
    let json = serde_json::to_value(failed_execution()).unwrap();
    assert_eq!(json["outcome"], "execution-failed");
    assert_eq!(json["failed_phase"], "execute");
    assert_eq!(json["phases"][0]["phase"], "bring-up");
    assert_eq!(json["phases"][1]["status"], "failed");
    assert!(json.get("notes").is_none());
}
