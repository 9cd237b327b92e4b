//! Event Router (spec §4.3): turns three OS signals into a typed channel.
//!
//! A dedicated thread iterates `signal_hook::iterator::SignalsInfo`, which
//! catches `SIGCHLD`/`SIGUSR1`/`SIGUSR2` outside of an async-signal-unsafe
//! handler context and exposes the sending process's pid via `WithOrigin`.
//! That thread never touches queue state; it only forwards a `SchedEvent`
//! over an `mpsc::Sender`. All queue mutation happens on the scheduler's
//! main thread after a `recv`/`recv_timeout`, which is what keeps this
//! crate free of the data races the source's global-plus-signal-handler
//! design was prone to (see SPEC_FULL.md's Event Router section).

use std::sync::mpsc::{self, Receiver};
use std::thread;

use signal_hook::consts::{SIGCHLD, SIGUSR1, SIGUSR2};
use signal_hook::iterator::exfiltrator::origin::WithOrigin;
use signal_hook::iterator::SignalsInfo;
use tracing::{trace, warn};

/// One of the three asynchronous sources the scheduler reacts to (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    /// A child with this pid terminated.
    ChildExited { child_id: u32 },
    /// The running child with this pid is entering an I/O phase.
    EnterIo { child_id: u32 },
    /// The previously-blocked child with this pid has finished I/O.
    LeaveIo { child_id: u32 },
}

/// Registers signal handlers for `SIGCHLD`, `SIGUSR1`, `SIGUSR2` and returns
/// a receiver the scheduler loop polls with `recv`/`recv_timeout`. The
/// signal-catching thread runs for the lifetime of the process; it is not
/// joined because the scheduler exits the whole process when both queues
/// drain (spec §5: "no global cancellation signal is defined").
pub fn spawn_router() -> anyhow::Result<Receiver<SchedEvent>> {
    let mut signals = SignalsInfo::<WithOrigin>::new([SIGCHLD, SIGUSR1, SIGUSR2])?;
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for info in signals.forever() {
            let Some(origin) = info.process else {
                // No siginfo pid available (e.g. signal sent by the kernel
                // without a process context). Nothing actionable to route.
                warn!(signal = info.signal, "signal with no origin pid; dropped");
                continue;
            };
            let child_id = origin.pid as u32;
            let event = match info.signal {
                SIGCHLD => SchedEvent::ChildExited { child_id },
                SIGUSR1 => SchedEvent::EnterIo { child_id },
                SIGUSR2 => SchedEvent::LeaveIo { child_id },
                other => {
                    trace!(signal = other, "unhandled signal, ignored");
                    continue;
                }
            };
            if tx.send(event).is_err() {
                // Receiver dropped: scheduler loop has exited, nothing left to do.
                break;
            }
        }
    });

    Ok(rx)
}
