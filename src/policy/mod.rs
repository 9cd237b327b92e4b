//! Shared scheduler state and event plumbing used by both policy drivers
//! (spec §4.4, §4.5). Each policy module owns its own control loop; this
//! module owns the state the loops mutate plus the bits of event handling
//! that are identical between FCFS and RR (spec §4.3's effect table and
//! §9's "this specification merges them into one coherent model").

pub mod fcfs;
pub mod round_robin;

use std::sync::mpsc::Receiver;
use std::time::Duration;

use tracing::{info, warn};

use crate::child;
use crate::clock::Clock;
use crate::descriptor::{DescriptorStore, Handle, Location, Status};
use crate::events::SchedEvent;
use crate::queue::Queue;
use crate::report::{self, CompletionReport};

/// Owns the ready/I/O queues, the descriptor store, the focus slot, and the
/// event channel for one scheduler run. Both policy drivers borrow this
/// mutably; only the driver thread (this process's main thread) ever
/// touches it — the signal-catching thread only sends `SchedEvent`s.
pub struct Scheduler {
    pub store: DescriptorStore,
    pub ready: Queue,
    pub io: Queue,
    pub events: Receiver<SchedEvent>,
    pub clock: Clock,
    focus: Option<Handle>,
}

/// Reason the current focus slot was cleared, reported back to the driver
/// so it knows whether to pick the next ready descriptor immediately (I/O
/// entry) or treat the slice as fully consumed (exit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    Exited,
    EnteredIo,
}

impl Scheduler {
    pub fn new(store: DescriptorStore, ready: Queue, events: Receiver<SchedEvent>) -> Self {
        Scheduler {
            store,
            ready,
            io: Queue::new(),
            events,
            clock: Clock,
            focus: None,
        }
    }

    /// Places `handle` into the focus slot (spec §3: "single-element
    /// register holding the descriptor currently being run").
    pub fn set_focus(&mut self, handle: Handle) {
        debug_assert!(self.focus.is_none());
        self.store.set_location(handle, Location::Focus);
        self.focus = Some(handle);
    }

    pub fn focus(&self) -> Option<Handle> {
        self.focus
    }

    fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Blocks until any event arrives, applies it, and returns what it means
    /// for the caller's current slice. Used by the FCFS driver's blocking
    /// wait (spec §4.4) and by the RR driver when both queues have gone
    /// empty around a still-blocked I/O descriptor (spec §4.5 tie-break).
    pub fn wait_for_slice_end(&mut self) -> anyhow::Result<SliceOutcome> {
        loop {
            let event = self.events.recv()?;
            if let Some(outcome) = self.apply_event(event)? {
                return Ok(outcome);
            }
        }
    }

    /// Polls the event channel for up to `timeout`, applying any event that
    /// arrives. Returns `Ok(None)` on timeout with no slice-ending event
    /// (the RR quantum ticker's per-tick check, spec §4.5).
    pub fn poll_event(&mut self, timeout: Duration) -> anyhow::Result<Option<SliceOutcome>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => self.apply_event(event),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("event router disconnected")
            }
        }
    }

    /// Applies one event to queue state (spec §4.3's effect table). Returns
    /// `Some(outcome)` when the event cleared the focus slot (i.e. ended the
    /// current slice), `None` for effects that don't touch the focus
    /// (`LeaveIO`, and any event not concerning the current focus).
    fn apply_event(&mut self, event: SchedEvent) -> anyhow::Result<Option<SliceOutcome>> {
        match event {
            SchedEvent::ChildExited { child_id } => self.on_child_exited(child_id),
            SchedEvent::EnterIo { child_id } => self.on_enter_io(child_id),
            SchedEvent::LeaveIo { child_id } => {
                self.on_leave_io(child_id);
                Ok(None)
            }
        }
    }

    fn on_child_exited(&mut self, child_id: u32) -> anyhow::Result<Option<SliceOutcome>> {
        let Some(handle) = self.focus else {
            warn!(child_id, "ChildExited with no focus descriptor; ignored");
            return Ok(None);
        };
        let desc = self.store.get(handle);
        if desc.child_id != Some(child_id) {
            warn!(
                child_id,
                focus_child_id = desc.child_id,
                "ChildExited id does not match focus; ignored"
            );
            return Ok(None);
        }

        let entry_time = desc.entry_time;
        let executable_name = desc.executable_name.clone();
        let route = desc.route.display().to_string();

        let Some(outcome) = child::reap_if_exited(self.store.get_mut(handle))? else {
            // Spurious SIGCHLD from this scheduler's own SIGSTOP/SIGCONT
            // (spec §5). The descriptor is still alive and still in focus;
            // this is not a slice-ending event.
            return Ok(None);
        };
        let elapsed = report::elapsed_since(entry_time);

        report::completion(&CompletionReport {
            child_id,
            exit_code: outcome.reported_code(),
            executable_name: &executable_name,
            route: &route,
            elapsed,
        });

        self.store.set_location(handle, Location::Nowhere);
        self.clear_focus();
        #[cfg(debug_assertions)]
        self.store.assert_invariants();
        Ok(Some(SliceOutcome::Exited))
    }

    fn on_enter_io(&mut self, child_id: u32) -> anyhow::Result<Option<SliceOutcome>> {
        let Some(handle) = self.focus else {
            warn!(child_id, "EnterIO with no focus descriptor; ignored");
            return Ok(None);
        };
        let desc = self.store.get(handle);
        if desc.child_id != Some(child_id) {
            warn!(
                child_id,
                focus_child_id = desc.child_id,
                "EnterIO id does not match focus; ignored"
            );
            return Ok(None);
        }

        info!(child_id, "entering I/O");
        self.store.get_mut(handle).status = Status::BlockedOnIo;
        self.io.enqueue(handle);
        self.store.set_location(handle, Location::Io);
        self.clear_focus();
        #[cfg(debug_assertions)]
        self.store.assert_invariants();
        Ok(Some(SliceOutcome::EnteredIo))
    }

    fn on_leave_io(&mut self, child_id: u32) {
        let Some(handle) = self.io.remove_by_child_id(&self.store, child_id) else {
            // spec §9 Open Question: logged and ignored rather than fatal.
            warn!(child_id, "LeaveIO for unknown child id; ignored");
            return;
        };
        info!(child_id, "leaving I/O");
        self.store.get_mut(handle).status = Status::Stopped;
        self.ready.enqueue(handle);
        self.store.set_location(handle, Location::Ready);
        #[cfg(debug_assertions)]
        self.store.assert_invariants();
    }

    /// Clears the focus slot and records where its descriptor went. Used by
    /// the RR driver's quantum-expiry path, which — unlike `ChildExited`/
    /// `EnterIO` — is decided by the driver itself, not by an event.
    pub fn release_focus_to(&mut self, handle: Handle, location: Location) {
        debug_assert_eq!(self.focus, Some(handle));
        self.store.set_location(handle, location);
        self.clear_focus();
        #[cfg(debug_assertions)]
        self.store.assert_invariants();
    }

    /// Blocks for exactly one event and applies it, without regard to
    /// whether it ended a slice. Used when the ready queue is empty but the
    /// run isn't drained yet — the only event that can arrive with nothing
    /// in focus is `LeaveIO`, which is what repopulates the ready queue
    /// (spec §4.4's "waits for a LeaveIO event before proceeding").
    pub fn wait_for_any_event(&mut self) -> anyhow::Result<()> {
        let event = self.events.recv()?;
        self.apply_event(event)?;
        Ok(())
    }

    /// True once both queues are empty and nothing is in focus: the
    /// terminal condition for every policy loop (spec §4.5 tie-break rule).
    pub fn is_drained(&self) -> bool {
        self.ready.is_empty() && self.io.is_empty() && self.focus.is_none()
    }
}
