//! Completion reports and transitional console lines (spec §4.6, §6).
//!
//! Kept free of queue/process plumbing so the format strings are directly
//! unit-testable; policies call these functions at the points spec §6 names.

use std::time::{Duration, SystemTime};

use tracing::info;

const BORDER: &str = "-----------------------------------------------------";

/// One completed workload's report line group (spec §6's bordered block).
pub struct CompletionReport<'a> {
    pub child_id: u32,
    pub exit_code: i32,
    pub executable_name: &'a str,
    pub route: &'a str,
    pub elapsed: Duration,
}

impl CompletionReport<'_> {
    /// Elapsed seconds at microsecond resolution, matching the source's `%.6f`.
    fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Emits the bordered completion block to stdout and a matching `tracing`
/// event to stderr (spec §4.6).
pub fn completion(report: &CompletionReport) {
    println!("{BORDER}");
    println!(
        "Process {} finished with code: {}",
        report.child_id, report.exit_code
    );
    println!("Executable: {}", report.executable_name);
    println!("Route: {}", report.route);
    println!("Time to execute: {:.6}", report.elapsed_secs());
    println!("{BORDER}");

    info!(
        child_id = report.child_id,
        exit_code = report.exit_code,
        executable = report.executable_name,
        elapsed_secs = report.elapsed_secs(),
        "workload completed"
    );
}

/// Like [`completion`] but annotates the block as a scheduler-initiated kill
/// rather than a natural exit, resolving the source's ambiguous "exit code
/// 0" on budget exhaustion (spec §4.5 outcome 2, §9 Design Notes).
pub fn completion_killed_on_budget(report: &CompletionReport) {
    println!("{BORDER}");
    println!(
        "Process {} finished with code: {} (terminated by scheduler — budget exhausted)",
        report.child_id, report.exit_code
    );
    println!("Executable: {}", report.executable_name);
    println!("Route: {}", report.route);
    println!("Time to execute: {:.6}", report.elapsed_secs());
    println!("{BORDER}");

    info!(
        child_id = report.child_id,
        executable = report.executable_name,
        elapsed_secs = report.elapsed_secs(),
        "workload killed on RR budget exhaustion"
    );
}

pub fn enqueued(executable_name: &str) {
    println!("Enqueued process: {executable_name}");
}

pub fn started(executable_name: &str, child_id: u32) {
    println!("Started process: {executable_name} (PID: {child_id})");
    info!(executable = executable_name, child_id, "started");
}

pub fn resuming(executable_name: &str, child_id: u32) {
    println!("Resuming process: {executable_name} (PID: {child_id})");
    info!(executable = executable_name, child_id, "resuming");
}

pub fn pausing(executable_name: &str, child_id: u32) {
    println!("Pausing process: {executable_name} (PID: {child_id})");
    info!(executable = executable_name, child_id, "pausing");
}

/// Wall-clock elapsed since `entry_time`, used for every completion report
/// (spec §4.6: measured against `entry_time`, not first-spawn time, so
/// queueing delay is included).
pub fn elapsed_since(entry_time: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(entry_time)
        .unwrap_or_default()
}
