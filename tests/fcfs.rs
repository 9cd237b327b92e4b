//! Black-box FCFS scenarios (spec §8 scenarios 1 and 4, plus boundaries).

#[path = "support/mod.rs"]
mod support;

use support::{fixture, run, stderr_of, stdout_of, TestHarness};

#[test]
fn runs_workloads_in_manifest_order() {
    let harness = TestHarness::new(&[fixture("quick_exit7.sh"), fixture("quick_exit0.sh")]);
    let output = run(
        &["FCFS", harness.manifest().to_str().unwrap()],
        &[],
    );
    assert!(output.status.success(), "{}", stdout_of(&output));

    let stdout = stdout_of(&output);
    let first = stdout
        .find("finished with code: 7")
        .expect("first workload's completion line");
    let second = stdout
        .find("finished with code: 0")
        .expect("second workload's completion line");
    assert!(
        first < second,
        "expected quick_exit7 to finish before quick_exit0 under FCFS:\n{stdout}"
    );
}

#[test]
fn single_workload_runs_to_completion() {
    let harness = TestHarness::new(&[fixture("quick_exit0.sh")]);
    let output = run(&["FCFS", harness.manifest().to_str().unwrap()], &[]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    // RR emits `Started process:`; FCFS never calls `report::started` (spec
    // §6: "RR additionally emits Started process...").
    assert!(stdout.contains("Enqueued process: quick_exit0.sh"));
    assert!(stdout.contains("finished with code: 0"));
}

#[test]
fn io_worker_completes_after_enter_and_leave_io() {
    let harness = TestHarness::new(&[fixture("io_worker.sh")]);
    let output = run(
        &["FCFS", harness.manifest().to_str().unwrap()],
        &[("BATCH_SCHED_IO_SECS", "0.05")],
    );
    assert!(output.status.success(), "{}", stdout_of(&output));
    assert!(stdout_of(&output).contains("finished with code: 0"));
}

#[test]
fn empty_manifest_produces_no_reports() {
    let harness = TestHarness::new(&[]);
    let output = run(&["FCFS", harness.manifest().to_str().unwrap()], &[]);
    assert!(output.status.success());
    assert!(!stdout_of(&output).contains("Started process"));
}

#[test]
fn missing_manifest_file_exits_nonzero() {
    let output = run(&["FCFS", "/nonexistent/path/manifest.txt"], &[]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("failed to open"));
}

/// spec §7: "SpawnFailed ... the descriptor is discarded with a logged
/// error, the scheduler continues with the next workload." A manifest
/// entry that fails to spawn (here, a nonexistent route) must not abort
/// the run; the remaining, spawnable workloads still complete.
#[test]
fn spawn_failure_is_recovered_and_run_continues() {
    let harness = TestHarness::new(&[
        "/nonexistent/route/does-not-exist".to_string(),
        fixture("quick_exit7.sh"),
        fixture("quick_exit0.sh"),
    ]);
    let output = run(&["FCFS", harness.manifest().to_str().unwrap()], &[]);
    assert!(output.status.success(), "{}", stdout_of(&output));

    let stdout = stdout_of(&output);
    assert_eq!(
        stdout.matches("finished with code:").count(),
        2,
        "expected both spawnable workloads to be reported despite the bad route:\n{stdout}"
    );
    assert!(stdout.contains("finished with code: 7"));
    assert!(stdout.contains("finished with code: 0"));
    assert!(
        stderr_of(&output).contains("spawn failed"),
        "expected the spawn failure to be logged:\n{}",
        stderr_of(&output)
    );
}
