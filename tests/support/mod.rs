//! Shared test harness for the black-box integration tests.
//!
//! Mirrors the compiled-binary-discovery and temp-root idiom of the
//! teacher crate's own integration tests: resolve the binary next to the
//! test binary, spawn it as a subprocess, and assert against its captured
//! stdout/stderr/status rather than calling into the library directly.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path to the compiled `batch-sched` binary.
pub fn binary() -> PathBuf {
    let mut p = std::env::current_exe().expect("current exe");
    p.pop(); // test binary's own file name
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("batch-sched");
    if cfg!(windows) {
        p.set_extension("exe");
    }
    p
}

/// Absolute path to a fixture script under `tests/fixtures/`.
pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

/// Owns a temp directory holding a generated manifest file.
pub struct TestHarness {
    _tmp: tempfile::TempDir,
    manifest_path: PathBuf,
}

impl TestHarness {
    /// Writes a manifest listing `routes` (one per line, in order).
    pub fn new(routes: &[String]) -> Self {
        let tmp = tempfile::tempdir().expect("create tempdir");
        let manifest_path = tmp.path().join("manifest.txt");
        let contents = routes.join("\n") + "\n";
        std::fs::write(&manifest_path, contents).expect("write manifest");
        TestHarness {
            _tmp: tmp,
            manifest_path,
        }
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest_path
    }
}

/// Runs the compiled binary with `args` and an optional extra set of
/// environment variables, returning the raw `Output`. Never panics on a
/// nonzero exit: scheduler usage errors are themselves under test.
pub fn run(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(binary());
    cmd.args(args);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().expect("run batch-sched")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
