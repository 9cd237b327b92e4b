//! FIFO queue of descriptor handles (spec §4.1).
//!
//! Two independent instances exist in practice: the ready queue and the I/O
//! queue. Touched only by the main scheduler thread — event effects are
//! applied after a channel `recv`, never from inside a signal handler, so no
//! locking is required here.

use crate::descriptor::{DescriptorStore, Handle};
use crate::error::EmptyQueue;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct Queue {
    nodes: VecDeque<Handle>,
}

impl Queue {
    pub fn new() -> Self {
        Queue {
            nodes: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, handle: Handle) {
        self.nodes.push_back(handle);
    }

    pub fn dequeue(&mut self) -> Result<Handle, EmptyQueue> {
        self.nodes.pop_front().ok_or(EmptyQueue)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Linear scan for the descriptor whose `child_id` matches. Used only by
    /// the `LeaveIO` handler (spec §4.1).
    pub fn find_by_child_id(&self, store: &DescriptorStore, child_id: u32) -> Option<Handle> {
        self.nodes
            .iter()
            .copied()
            .find(|&h| store.get(h).child_id == Some(child_id))
    }

    /// Remove and return the node located by `find_by_child_id`. A `LeaveIO`
    /// targeting an id not present is the caller's responsibility to detect
    /// and log (spec §9 Open Question): this simply returns `None`.
    pub fn remove_by_child_id(&mut self, store: &DescriptorStore, child_id: u32) -> Option<Handle> {
        let pos = self
            .nodes
            .iter()
            .position(|&h| store.get(h).child_id == Some(child_id))?;
        self.nodes.remove(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn fifo_ordering_preserved() {
        let mut store = DescriptorStore::new();
        let mut q = Queue::new();
        let a = store.allocate("a".into(), "./a".into(), SystemTime::now());
        let b = store.allocate("b".into(), "./b".into(), SystemTime::now());
        q.enqueue(a);
        q.enqueue(b);
        assert_eq!(q.dequeue().unwrap(), a);
        assert_eq!(q.dequeue().unwrap(), b);
    }

    #[test]
    fn dequeue_on_empty_fails() {
        let mut q = Queue::new();
        assert!(q.dequeue().is_err());
    }

    #[test]
    fn enqueue_then_dequeue_is_same_identity() {
        let mut store = DescriptorStore::new();
        let mut q = Queue::new();
        let a = store.allocate("a".into(), "./a".into(), SystemTime::now());
        q.enqueue(a);
        let out = q.dequeue().unwrap();
        assert_eq!(out, a);
    }

    #[test]
    fn find_and_remove_by_child_id() {
        let mut store = DescriptorStore::new();
        let mut q = Queue::new();
        let a = store.allocate("a".into(), "./a".into(), SystemTime::now());
        store.get_mut(a).child_id = Some(42);
        q.enqueue(a);

        assert_eq!(q.find_by_child_id(&store, 42), Some(a));
        assert_eq!(q.find_by_child_id(&store, 7), None);

        let removed = q.remove_by_child_id(&store, 42);
        assert_eq!(removed, Some(a));
        assert!(q.is_empty());
    }

    #[test]
    fn remove_by_unknown_child_id_is_none() {
        let mut store = DescriptorStore::new();
        let mut q = Queue::new();
        let a = store.allocate("a".into(), "./a".into(), SystemTime::now());
        store.get_mut(a).child_id = Some(1);
        q.enqueue(a);
        assert_eq!(q.remove_by_child_id(&store, 999), None);
        assert_eq!(q.len(), 1);
    }
}
