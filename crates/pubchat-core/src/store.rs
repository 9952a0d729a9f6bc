//! Append-Only Message Store
//!
//! The store is the sole owner of display state. It is owned by a single task
//! (the session loop) which is the only writer; readers get immutable
//! snapshots through a `watch` channel. Each append publishes the new snapshot
//! in the same step as the push, so an observer never sees half an append.

use crate::errors::{Result, StoreError};
use crate::types::{Message, MessageId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared, read-only view of the message sequence
pub type Snapshot = Arc<Vec<Message>>;

// ----------------------------------------------------------------------------
// Message Store
// ----------------------------------------------------------------------------

/// Ordered, observable collection of display messages
#[derive(Debug)]
pub struct MessageStore {
    ids: HashSet<MessageId>,
    view: watch::Sender<Snapshot>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        let (view, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            ids: HashSet::new(),
            view,
        }
    }

    /// Append a message at the end of the sequence and notify observers
    pub fn append(&mut self, message: Message) -> Result<()> {
        if !self.ids.insert(message.id) {
            return Err(StoreError::DuplicateId { id: message.id }.into());
        }
        // Copy-on-write: only clones when a reader still holds the old snapshot
        self.view
            .send_modify(|snapshot| Arc::make_mut(snapshot).push(message));
        Ok(())
    }

    /// Current sequence in append order
    pub fn snapshot(&self) -> Snapshot {
        self.view.borrow().clone()
    }

    /// Register for change notifications
    pub fn subscribe(&self) -> StoreObserver {
        StoreObserver {
            receiver: self.view.subscribe(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Store Observer
// ----------------------------------------------------------------------------

/// Change-notification handle for a `MessageStore`.
///
/// Notifications coalesce: a slow observer wakes once and sees the latest
/// snapshot rather than every intermediate one. Per-append notification is
/// carried by `AppEvent::MessageAppended`.
#[derive(Debug, Clone)]
pub struct StoreObserver {
    receiver: watch::Receiver<Snapshot>,
}

impl StoreObserver {
    /// Latest snapshot without marking it as seen
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Latest snapshot, marking it as seen
    pub fn snapshot(&mut self) -> Snapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until the store changes and return the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.snapshot())
    }

    /// Wait until the store holds at least `count` messages.
    /// Returns `None` if the store is dropped first.
    pub async fn wait_for_len(&mut self, count: usize) -> Option<Snapshot> {
        self.receiver
            .wait_for(|snapshot| snapshot.len() >= count)
            .await
            .ok()
            .map(|snapshot| Arc::clone(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatError;

    #[test]
    fn appends_in_call_order() {
        let mut store = MessageStore::new();
        for text in ["one", "two", "three"] {
            store.append(Message::new("received", text)).unwrap();
        }

        let texts: Vec<_> = store
            .snapshot()
            .iter()
            .map(|m| m.message_text.clone())
            .collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut store = MessageStore::new();
        let message = Message::new("received", "hello");
        store.append(message.clone()).unwrap();

        let err = store.append(message).unwrap_err();
        assert!(matches!(
            err,
            ChatError::Store(StoreError::DuplicateId { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn old_snapshots_are_not_mutated() {
        let mut store = MessageStore::new();
        store.append(Message::new("received", "first")).unwrap();
        let before = store.snapshot();

        store.append(Message::new("received", "second")).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn observers_are_notified_on_append() {
        let mut store = MessageStore::new();
        let mut observer = store.subscribe();

        store.append(Message::new("received", "ping")).unwrap();

        let snapshot = observer.changed().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].message_text, "ping");
    }

    #[tokio::test]
    async fn observer_ends_when_store_is_dropped() {
        let store = MessageStore::new();
        let mut observer = store.subscribe();
        drop(store);

        assert!(observer.changed().await.is_none());
    }
}
