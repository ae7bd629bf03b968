use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use super::ReaderId;

/// Change notifications emitted by the registry and the assignment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    ReaderAdded(ReaderId),
    ReaderRemoved(ReaderId),
    ReaderRenamed(ReaderId),
    DefaultReaderChanged(ReaderId),
    AssignmentAdded(PathBuf),
    AssignmentRemoved(PathBuf),
    AssignmentUpdated(PathBuf),
    /// Number of assignments dropped because their files vanished.
    AssignmentsPruned(usize),
}

/// Handle returned by [`Observers::subscribe`], unique across every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(0);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback = Box<dyn FnMut(&LibraryEvent) + Send>;

/// Subscriber list owned by an observable collection.
#[derive(Default)]
pub struct Observers {
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    /// Register a callback invoked for every subsequent event.
    pub fn subscribe(&mut self, callback: impl FnMut(&LibraryEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Drop a subscription; returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    pub(crate) fn emit(&mut self, event: LibraryEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
