//! Process descriptor store (spec §3, §4.3).
//!
//! Descriptors live in an arena (`Vec<ProcessDescriptor>`) and are referenced
//! by a stable, `Copy` handle rather than by pointer or by value. A `Location`
//! tag tracks which of {ready queue, I/O queue, focus slot, nowhere/exited} a
//! descriptor currently occupies, so "at most one queue at a time" (spec's
//! core invariant) is something a debug assertion can check instead of
//! something only a signal-handler author has to remember.

use std::path::PathBuf;
use std::time::SystemTime;

/// Initial CPU budget granted to a descriptor under Round-Robin (spec §3, §4.5).
pub const INITIAL_RR_BUDGET_MS: u64 = 5000;

/// Stable reference to a `ProcessDescriptor` inside a `DescriptorStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

/// Lifecycle state of a workload (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    New,
    Running,
    Stopped,
    BlockedOnIo,
    Exited,
}

/// Where a descriptor currently lives. Exactly one of these is true for any
/// live (non-`Exited`) descriptor at any instant (spec §3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Ready,
    Io,
    Focus,
    /// Not referenced from any queue or the focus slot: either not yet
    /// enqueued, or already reaped and reported.
    Nowhere,
}

/// One workload's bookkeeping record.
#[derive(Debug, Clone)]
pub struct ProcessDescriptor {
    pub executable_name: String,
    pub route: PathBuf,
    /// OS process id; unset (sentinel) before first spawn.
    pub child_id: Option<u32>,
    pub status: Status,
    /// Immutable after creation; used for total-elapsed reporting.
    pub entry_time: SystemTime,
    /// Milliseconds of CPU still owed under RR. Ignored under FCFS.
    pub remaining_budget_ms: u64,
    location: Location,
}

impl ProcessDescriptor {
    fn new(executable_name: String, route: PathBuf, entry_time: SystemTime) -> Self {
        ProcessDescriptor {
            executable_name,
            route,
            child_id: None,
            status: Status::New,
            entry_time,
            remaining_budget_ms: INITIAL_RR_BUDGET_MS,
            location: Location::Nowhere,
        }
    }
}

/// Owns every descriptor allocated for one scheduler run.
#[derive(Debug, Default)]
pub struct DescriptorStore {
    descriptors: Vec<ProcessDescriptor>,
}

impl DescriptorStore {
    pub fn new() -> Self {
        DescriptorStore {
            descriptors: Vec::new(),
        }
    }

    /// Allocate a new descriptor (manifest-loader's only write path). Returns
    /// a stable handle; initial location is `Nowhere` until the caller
    /// enqueues it on the ready queue.
    pub fn allocate(
        &mut self,
        executable_name: String,
        route: PathBuf,
        entry_time: SystemTime,
    ) -> Handle {
        let idx = self.descriptors.len();
        self.descriptors
            .push(ProcessDescriptor::new(executable_name, route, entry_time));
        Handle(idx)
    }

    pub fn get(&self, handle: Handle) -> &ProcessDescriptor {
        &self.descriptors[handle.0]
    }

    pub fn get_mut(&mut self, handle: Handle) -> &mut ProcessDescriptor {
        &mut self.descriptors[handle.0]
    }

    pub fn location(&self, handle: Handle) -> Location {
        self.descriptors[handle.0].location
    }

    pub fn set_location(&mut self, handle: Handle, location: Location) {
        self.descriptors[handle.0].location = location;
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Debug-only global invariant check: every live descriptor is in at
    /// most one place, and no `Exited` descriptor is reachable from a queue
    /// or the focus slot.
    #[cfg(debug_assertions)]
    pub fn assert_invariants(&self) {
        for d in &self.descriptors {
            if d.status == Status::Exited {
                debug_assert_ne!(
                    d.location,
                    Location::Ready,
                    "exited descriptor still in ready queue"
                );
                debug_assert_ne!(
                    d.location,
                    Location::Io,
                    "exited descriptor still in I/O queue"
                );
                debug_assert_ne!(
                    d.location,
                    Location::Focus,
                    "exited descriptor still in focus slot"
                );
            }
        }
    }
}
