//! First-Come-First-Served driver (spec §4.4).
//!
//! Each workload runs to completion (or to an I/O phase) before the next is
//! considered; `suspend` is never called under this policy.

use tracing::{debug, warn};

use crate::child;
use crate::descriptor::{Location, Status};
use crate::policy::{Scheduler, SliceOutcome};

/// Runs the FCFS loop to completion (both queues drained, nothing in focus).
pub fn run(sched: &mut Scheduler) -> anyhow::Result<()> {
    while !sched.is_drained() {
        if sched.ready.is_empty() {
            // Ready queue empty but the run isn't over: at least one
            // descriptor is blocked on I/O. Wait for it to leave rather
            // than spin (spec §4.4).
            debug!("ready queue empty, waiting for LeaveIO");
            sched.wait_for_any_event()?;
            continue;
        }

        let handle = sched.ready.dequeue()?;
        sched.set_focus(handle);

        let desc = sched.store.get(handle);
        if desc.status == Status::Stopped {
            child::resume(sched.store.get_mut(handle))?;
        } else if let Err(e) = child::spawn(sched.store.get_mut(handle)) {
            // spec §7: a spawn failure is recovered locally by discarding
            // the descriptor, not by aborting the whole run.
            warn!(error = %e, "spawn failed; discarding descriptor and continuing");
            sched.release_focus_to(handle, Location::Nowhere);
            continue;
        }

        // Block until ChildExited or EnterIO clears the focus slot. Under
        // FCFS this is the entire "quantum": unbounded, OS-scheduled.
        match sched.wait_for_slice_end()? {
            SliceOutcome::Exited | SliceOutcome::EnteredIo => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    // Exercised end-to-end in tests/fcfs.rs against real fixture
    // executables; policy logic here is thin enough that unit tests would
    // only re-assert `Scheduler`'s own behavior (already covered in
    // policy::mod's tests).
}
