//! Marker error types for the scheduler's error kinds (see spec §7).
//!
//! These are small `Debug + Display` structs rather than a `thiserror` enum:
//! callers distinguish them from a generic `anyhow::Error` via
//! `downcast_ref`, the same pattern the rest of this crate's ancestry uses
//! for source-specific errors.

use std::fmt;

/// Dequeue attempted on an empty queue. A programming error: every call site
/// checks `is_empty()` first, so this indicates a logic bug in the caller.
#[derive(Debug)]
pub struct EmptyQueue;

impl fmt::Display for EmptyQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dequeue on empty queue")
    }
}

impl std::error::Error for EmptyQueue {}

/// `fork`/`exec` (in practice: `std::process::Command::spawn`) failed.
#[derive(Debug)]
pub struct SpawnFailed {
    pub route: String,
    pub source: std::io::Error,
}

impl fmt::Display for SpawnFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to spawn {}: {}", self.route, self.source)
    }
}

impl std::error::Error for SpawnFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// CLI usage mismatch: unknown policy, wrong argument count, non-positive quantum.
#[derive(Debug)]
pub struct BadArguments(pub String);

impl fmt::Display for BadArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadArguments {}

/// Manifest file could not be opened.
#[derive(Debug)]
pub struct OpenFailed {
    pub path: String,
    pub source: std::io::Error,
}

impl fmt::Display for OpenFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to open {}: {}", self.path, self.source)
    }
}

impl std::error::Error for OpenFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Out-of-memory allocating a descriptor or queue node.
///
/// Rust's global allocator aborts on allocation failure rather than
/// returning `Err`, so in practice this variant is unreachable; it is kept
/// only because spec §7 names it as a distinct error kind and a future
/// fallible-allocation path (`try_reserve`, etc.) would want to report it.
#[derive(Debug)]
pub struct AllocationFailed;

impl fmt::Display for AllocationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocation failed")
    }
}

impl std::error::Error for AllocationFailed {}
