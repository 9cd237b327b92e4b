//! Round-Robin driver (spec §4.5), with the cooperative I/O protocol
//! integrated natively — there is no separate RR-without-I/O code path; a
//! workload that never signals `EnterIO`/`LeaveIO` simply never visits the
//! I/O queue, collapsing the source's two diverging drafts into one model
//! (spec §9).

use std::time::Duration;

use tracing::{debug, warn};

use crate::child;
use crate::descriptor::Location;
use crate::policy::{Scheduler, SliceOutcome};
use crate::report::{self, CompletionReport};

/// Granularity of the quantum ticker's bounded wait. The source polls
/// `try_reap` every 1ms; this driver instead does a bounded channel `recv`
/// at the same cadence, which also catches `ChildExited`/`EnterIO` without a
/// second polling primitive (spec §9 Design Notes).
const TICK: Duration = Duration::from_millis(1);

/// Runs the RR loop to completion (both queues drained, nothing in focus).
pub fn run(sched: &mut Scheduler, quantum_ms: u64) -> anyhow::Result<()> {
    let quantum = Duration::from_millis(quantum_ms);

    while !sched.is_drained() {
        if sched.ready.is_empty() {
            // Nothing eligible to run right now but the I/O queue still
            // holds at least one descriptor: wait for it to leave rather
            // than spin (spec §4.5 tie-break).
            debug!("ready queue empty, waiting for LeaveIO");
            sched.wait_for_any_event()?;
            continue;
        }

        let handle = sched.ready.dequeue()?;
        sched.set_focus(handle);

        let desc = sched.store.get(handle);
        let executable_name = desc.executable_name.clone();
        if desc.child_id.is_none() {
            if let Err(e) = child::spawn(sched.store.get_mut(handle)) {
                // spec §7: a spawn failure is recovered locally by
                // discarding the descriptor, not by aborting the whole run.
                warn!(error = %e, "spawn failed; discarding descriptor and continuing");
                sched.release_focus_to(handle, Location::Nowhere);
                continue;
            }
            let child_id = sched.store.get(handle).child_id.expect("just spawned");
            report::started(&executable_name, child_id);
        } else {
            child::resume(sched.store.get_mut(handle))?;
            let child_id = sched.store.get(handle).child_id.expect("resumed handle has a pid");
            report::resuming(&executable_name, child_id);
        }

        let start = sched.clock.now();
        let mut slice_ended = None;
        loop {
            let remaining = quantum.saturating_sub(sched.clock.elapsed(start));
            if remaining.is_zero() {
                break;
            }
            let tick = remaining.min(TICK);
            if let Some(outcome) = sched.poll_event(tick)? {
                slice_ended = Some(outcome);
                break;
            }
        }

        match slice_ended {
            // Reported and freed inside `apply_event`; EnterIO already moved
            // the descriptor to the I/O queue. Either way: next iteration.
            Some(SliceOutcome::Exited) | Some(SliceOutcome::EnteredIo) => continue,

            // Quantum elapsed with the child still alive: preempt it.
            None => {
                let desc = sched.store.get(handle);
                let child_id = desc.child_id.expect("running handle has a pid");
                let executable_name = desc.executable_name.clone();

                report::pausing(&executable_name, child_id);
                child::suspend(sched.store.get_mut(handle))?;

                let desc = sched.store.get_mut(handle);
                desc.remaining_budget_ms = desc.remaining_budget_ms.saturating_sub(quantum_ms);

                if desc.remaining_budget_ms > 0 {
                    sched.ready.enqueue(handle);
                    sched.release_focus_to(handle, Location::Ready);
                } else {
                    let route = sched.store.get(handle).route.display().to_string();
                    let entry_time = sched.store.get(handle).entry_time;
                    child::kill(sched.store.get_mut(handle))?;
                    let elapsed = report::elapsed_since(entry_time);
                    // spec §4.5 outcome 2: reported with exit code zero,
                    // distinguished from a genuine zero-exit by the message
                    // text rather than the code (§9 Design Notes).
                    report::completion_killed_on_budget(&CompletionReport {
                        child_id,
                        exit_code: 0,
                        executable_name: &executable_name,
                        route: &route,
                        elapsed,
                    });
                    sched.release_focus_to(handle, Location::Nowhere);
                }
            }
        }
    }
    Ok(())
}
