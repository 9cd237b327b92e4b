//! Child process lifecycle: spawn, suspend, resume, kill, reap (spec §4.2).
//!
//! Spawning goes through `std::process::Command` — the teacher crate's own
//! pattern for launching workloads (see `run.rs`'s supervisor spawn). Signal
//! delivery and reaping go through `nix`, since stopping/continuing/waiting
//! on an arbitrary pid has no `std::process` equivalent once the `Child`
//! handle's owning `Command` didn't set up pipes for it.

use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, info};

use crate::descriptor::{ProcessDescriptor, Status};
use crate::error::SpawnFailed;

/// Outcome of a reap, independent of how the child actually died.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// Exited normally; carries `WEXITSTATUS`.
    Exited(i32),
    /// Killed by a signal before exiting; carries the signal number.
    Signaled(i32),
}

impl Outcome {
    /// Exit code as the reporter renders it: a normal exit reports its own
    /// code; a signal death is reported 128+signum, the common shell
    /// convention (the original C source only ever called `WEXITSTATUS`,
    /// which is meaningless for a signalled process — see SPEC_FULL.md).
    pub fn reported_code(&self) -> i32 {
        match self {
            Outcome::Exited(code) => *code,
            Outcome::Signaled(sig) => 128 + sig,
        }
    }
}

fn from_wait_status(status: WaitStatus) -> Option<Outcome> {
    match status {
        WaitStatus::Exited(_, code) => Some(Outcome::Exited(code)),
        WaitStatus::Signaled(_, sig, _) => Some(Outcome::Signaled(sig as i32)),
        _ => None,
    }
}

/// Spawns `desc.route`, passing `desc.executable_name` as argv[0] and no
/// further arguments (spec §4.2). Stdio is inherited so workload output
/// lands on the scheduler's own stdout/stderr, matching the unredirected
/// `execlp` the source uses.
pub fn spawn(desc: &mut ProcessDescriptor) -> Result<(), SpawnFailed> {
    let child = Command::new(&desc.route)
        .arg0(&desc.executable_name)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| SpawnFailed {
            route: desc.route.display().to_string(),
            source,
        })?;

    let pid = child.id();
    // We manage this child entirely through raw pid-based signal/wait
    // calls from here on (to support suspend/resume and non-blocking reap,
    // neither of which `std::process::Child` exposes), so the `Child`
    // handle itself is dropped without calling `.wait()`. `mem::forget`
    // would leak the child's stdio handles; we simply let it fall out of
    // scope, which is safe because we never rely on `Child::wait` again.
    std::mem::drop(child);

    desc.child_id = Some(pid);
    desc.status = Status::Running;
    info!(pid, route = %desc.route.display(), "spawned");
    Ok(())
}

fn child_pid(desc: &ProcessDescriptor) -> Pid {
    Pid::from_raw(desc.child_id.expect("spawn before suspend/resume/kill/reap") as i32)
}

/// Sends `SIGSTOP`. Requires `status == Running`. Idempotent: the OS treats
/// a second `SIGSTOP` to an already-stopped process as a no-op, so repeated
/// calls never error.
pub fn suspend(desc: &mut ProcessDescriptor) -> anyhow::Result<()> {
    debug_assert_eq!(desc.status, Status::Running);
    let pid = child_pid(desc);
    signal::kill(pid, Signal::SIGSTOP)?;
    desc.status = Status::Stopped;
    info!(pid = pid.as_raw(), "suspended");
    Ok(())
}

/// Sends `SIGCONT`. Requires `status ∈ {Stopped, BlockedOnIo}`.
pub fn resume(desc: &mut ProcessDescriptor) -> anyhow::Result<()> {
    debug_assert!(matches!(desc.status, Status::Stopped | Status::BlockedOnIo));
    let pid = child_pid(desc);
    signal::kill(pid, Signal::SIGCONT)?;
    desc.status = Status::Running;
    info!(pid = pid.as_raw(), "resumed");
    Ok(())
}

/// Sends `SIGKILL`, then blocks until the child is reaped.
pub fn kill(desc: &mut ProcessDescriptor) -> anyhow::Result<Outcome> {
    let pid = child_pid(desc);
    signal::kill(pid, Signal::SIGKILL)?;
    let status = wait::waitpid(pid, None)?;
    desc.status = Status::Exited;
    let outcome = from_wait_status(status).unwrap_or(Outcome::Signaled(Signal::SIGKILL as i32));
    info!(pid = pid.as_raw(), "killed and reaped");
    Ok(outcome)
}

/// Reaps `desc`'s pid if it has genuinely terminated, used by the
/// `ChildExited` event handler. Linux delivers `SIGCHLD` on a child's
/// `SIGSTOP`/`SIGCONT` transitions too, not only on exit (spec §5), so this
/// scheduler's own `suspend`/`resume` calls routinely raise a `ChildExited`
/// event for a descriptor that is still alive. `WUNTRACED`/`WCONTINUED`
/// make those transitions visible (so the kernel doesn't keep re-reporting
/// them) while `WNOHANG` keeps this non-blocking: a blocking wait here would
/// stall the driver on the child's eventual real exit, defeating RR
/// preemption. Returns `None` for a stop/continue notification or if the
/// child is simply not done yet.
pub fn reap_if_exited(desc: &mut ProcessDescriptor) -> anyhow::Result<Option<Outcome>> {
    let pid = child_pid(desc);
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
    let status = wait::waitpid(pid, Some(flags))?;
    match status {
        WaitStatus::Exited(..) | WaitStatus::Signaled(..) => {
            let outcome = from_wait_status(status).expect("matched Exited/Signaled above");
            desc.status = Status::Exited;
            debug!(pid = pid.as_raw(), ?outcome, "reaped");
            Ok(Some(outcome))
        }
        WaitStatus::Stopped(..) | WaitStatus::Continued(..) => {
            debug!(
                pid = pid.as_raw(),
                ?status,
                "ignoring spurious SIGCHLD from our own stop/continue"
            );
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Non-blocking reap. Returns `None` if the child is still alive.
pub fn try_reap(desc: &mut ProcessDescriptor) -> anyhow::Result<Option<Outcome>> {
    let pid = child_pid(desc);
    let status = wait::waitpid(pid, Some(WaitPidFlag::WNOHANG))?;
    match from_wait_status(status) {
        Some(outcome) => {
            desc.status = Status::Exited;
            debug!(pid = pid.as_raw(), ?outcome, "reaped");
            Ok(Some(outcome))
        }
        None => Ok(None),
    }
}
