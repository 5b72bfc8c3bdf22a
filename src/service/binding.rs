//! Binding lifecycle tracking.
//!
//! # Responsibilities
//! - Give each caller connection a unique identity for tracing
//! - Track open bindings so shutdown can drain them
//! - Close a binding at most once, including on drop

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global atomic counter for binding IDs. Relaxed ordering is sufficient
/// since we only need uniqueness, not synchronization.
static BINDING_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one caller binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        Self(BINDING_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

/// Tracks open bindings for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct BindingTracker {
    active: Arc<AtomicU64>,
}

impl BindingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new binding. It stays counted until closed or dropped.
    pub fn bind(&self) -> Binding {
        self.active.fetch_add(1, Ordering::SeqCst);
        Binding {
            id: BindingId::next(),
            active: Arc::clone(&self.active),
            closed: false,
        }
    }

    /// Number of currently open bindings.
    pub fn active(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until every binding has closed.
    pub async fn drained(&self) {
        while self.active() > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    }
}

/// One caller connection's lifetime. The loader it owns must never deliver
/// a response once the binding is closed.
#[derive(Debug)]
pub struct Binding {
    id: BindingId,
    active: Arc<AtomicU64>,
    closed: bool,
}

impl Binding {
    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the binding. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.active.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(binding = %self.id, "binding closed");
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_ids_are_unique() {
        let tracker = BindingTracker::new();
        let a = tracker.bind();
        let b = tracker.bind();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn tracker_counts_open_bindings() {
        let tracker = BindingTracker::new();
        assert_eq!(tracker.active(), 0);

        let first = tracker.bind();
        let second = tracker.bind();
        assert_eq!(tracker.active(), 2);

        drop(first);
        assert_eq!(tracker.active(), 1);

        drop(second);
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn close_is_idempotent() {
        let tracker = BindingTracker::new();
        let mut binding = tracker.bind();
        binding.close();
        binding.close();
        assert_eq!(tracker.active(), 0);
        drop(binding);
        assert_eq!(tracker.active(), 0);
    }
}
