//! PubChat Core
//!
//! This crate provides the foundational types and session state for the PubChat
//! client: the envelope codec, the append-only message store, the subscription
//! listener and the publisher, together with the CSP channel schema that the
//! runtime and the transports use to talk to each other.
//!
//! Nothing in here performs I/O. Transports live in their own crates and the
//! session loop that owns this state lives in `pubchat-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod channel;
pub mod codec;
pub mod config;
pub mod errors;
pub mod listener;
pub mod publisher;
pub mod store;
pub mod transport_task;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use channel::{
    create_app_event_channel, create_command_channel, create_effect_channel,
    create_effect_receiver, create_event_channel, AppEvent, AppEventReceiver, AppEventSender,
    Command, CommandReceiver, CommandSender, Effect, EffectReceiver, EffectSender, Event,
    EventReceiver, EventSender, StatusEvent,
};
pub use codec::{decode, decode_slice, encode, encode_to_vec};
pub use config::{ChannelConfig, SessionConfig};
pub use errors::{
    ChatError, ChatResult, DecodeError, ListenerError, PublishError, Result, StoreError,
    TransportError,
};
pub use listener::{ListenerState, ListenerStats, SubscriptionListener};
pub use publisher::{Publisher, PublisherStats};
pub use store::{MessageStore, Snapshot, StoreObserver};
pub use transport_task::TransportTask;
pub use types::{
    ChannelName, ClientId, DeliveryToken, EntryUpdate, Message, MessageId, PublishId, Timestamp,
    DEFAULT_ENTRY, RECEIVED_MESSAGE_TYPE,
};
