//! PubChat Runtime Engine
//!
//! This crate contains the session engine for PubChat:
//! - `ChatRuntime`: wires transports to the session and manages their tasks
//! - `SessionLogicTask`: the single-owner loop holding the message store,
//!   the subscription listener and the publisher
//! - `ChatHandle`: the boundary a UI talks to
//!
//! `pubchat-core` provides the types and state; this crate runs them.

mod handle;
pub mod logic;
mod runtime;

pub use handle::{ChatHandle, PublishStatus};
pub use runtime::*;

// Re-export core types for convenience
pub use pubchat_core::{
    AppEvent, AppEventReceiver, ChannelName, ChatError, ChatResult, Command, Effect, Event,
    Message, SessionConfig, Snapshot, StatusEvent, StoreObserver, TransportTask,
};
