//! Property-based tests for the message store
//!
//! These verify the append-only invariants: every append lands exactly once,
//! identifiers stay unique, and order follows the order of the append calls.

use proptest::prelude::*;
use pubchat_core::{codec, ChannelName, EntryUpdate, Message, MessageStore, SubscriptionListener};
use std::collections::HashSet;

/// Arbitrary display texts
fn arb_texts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9 .,!?]{0,60}", 0..64)
}

proptest! {
    /// Property: N appends yield exactly N entries with unique ids, in call order
    #[test]
    fn appends_are_counted_and_ordered(texts in arb_texts()) {
        let mut store = MessageStore::new();
        for text in &texts {
            store.append(Message::new("received", text.clone())).expect("fresh ids append");
        }

        let snapshot = store.snapshot();
        prop_assert_eq!(snapshot.len(), texts.len());

        let ids: HashSet<_> = snapshot.iter().map(|m| m.id).collect();
        prop_assert_eq!(ids.len(), texts.len());

        let stored: Vec<_> = snapshot.iter().map(|m| m.message_text.clone()).collect();
        prop_assert_eq!(stored, texts);
    }

    /// Property: a snapshot taken earlier is a prefix of any later snapshot
    #[test]
    fn earlier_snapshots_are_prefixes(texts in arb_texts(), split in 0usize..64) {
        let mut store = MessageStore::new();
        let split = split.min(texts.len());

        for text in &texts[..split] {
            store.append(Message::new("received", text.clone())).unwrap();
        }
        let early = store.snapshot();

        for text in &texts[split..] {
            store.append(Message::new("received", text.clone())).unwrap();
        }
        let late = store.snapshot();

        prop_assert_eq!(early.len(), split);
        prop_assert_eq!(&late[..split], &early[..]);
    }

    /// Property: listener + store only grow on decodable payloads
    #[test]
    fn only_decodable_payloads_are_stored(
        updates in prop::collection::vec(prop::option::of("[a-z]{1,12}"), 0..32)
    ) {
        let channel = ChannelName::new("the_guide");
        let mut listener = SubscriptionListener::new();
        listener.bind(channel.clone(), true).unwrap();
        let mut store = MessageStore::new();

        for update in &updates {
            let payload = match update {
                Some(text) => codec::encode(&EntryUpdate::with_entry(text.as_str(), "Alice")),
                None => serde_json::json!({"entry": "Bob"}),
            };
            if let Some(message) = listener.handle_message(&channel, &payload) {
                store.append(message).unwrap();
            }
        }

        let expected = updates.iter().filter(|u| u.is_some()).count();
        prop_assert_eq!(store.len(), expected);
    }
}
