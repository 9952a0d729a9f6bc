//! Core types for PubChat
//!
//! Newtypes for the session's identifiers plus the two value types that flow
//! through the client: the wire envelope (`EntryUpdate`) and the display record
//! (`Message`).

use core::fmt;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Sender name used when an envelope does not carry one
pub const DEFAULT_ENTRY: &str = "User";

/// `message_type` label of messages materialized from inbound envelopes
pub const RECEIVED_MESSAGE_TYPE: &str = "received";

// ----------------------------------------------------------------------------
// Channel Identity
// ----------------------------------------------------------------------------

/// Name of a topic on the pub/sub network
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Suffix the network uses for a channel's presence side channel
    pub const PRESENCE_SUFFIX: &'static str = "-pnpres";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The presence side channel paired with this channel
    pub fn presence(&self) -> ChannelName {
        Self(format!("{}{}", self.0, Self::PRESENCE_SUFFIX))
    }

    /// Whether this is a presence side channel
    pub fn is_presence(&self) -> bool {
        self.0.ends_with(Self::PRESENCE_SUFFIX)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identifier this client presents to the network, constant for a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random UUID-style identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ----------------------------------------------------------------------------
// Envelope
// ----------------------------------------------------------------------------

/// Wire-level unit exchanged over the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryUpdate {
    update: String,
    entry: String,
}

impl EntryUpdate {
    /// Envelope sent under the placeholder sender name
    pub fn new(update: impl Into<String>) -> Self {
        Self::with_entry(update, DEFAULT_ENTRY)
    }

    pub fn with_entry(update: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            update: update.into(),
            entry: entry.into(),
        }
    }

    pub fn update(&self) -> &str {
        &self.update
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Human-readable rendering used as a message's display text
    pub fn display_text(&self) -> String {
        format!("entry: {}, update: {}", self.entry, self.update)
    }
}

// ----------------------------------------------------------------------------
// Display Message
// ----------------------------------------------------------------------------

/// Identifier of a display message, generated at creation and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(uuid::Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locally materialized, UI-facing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Short category label, e.g. "received"
    pub message_type: String,
    pub message_text: String,
    /// Wall clock time the record was created. Display order is append order.
    pub received_at: Timestamp,
}

impl Message {
    pub fn new(message_type: impl Into<String>, message_text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            message_type: message_type.into(),
            message_text: message_text.into(),
            received_at: Timestamp::now(),
        }
    }

    /// Display record for an envelope that arrived through the subscription
    pub fn received(envelope: &EntryUpdate) -> Self {
        Self::new(RECEIVED_MESSAGE_TYPE, envelope.display_text())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.message_type, self.message_text)
    }
}

// ----------------------------------------------------------------------------
// Delivery
// ----------------------------------------------------------------------------

/// Opaque token the network hands back for a delivered publish.
///
/// PubNub timetokens count 100ns ticks since the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryToken(u64);

impl DeliveryToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_unix_millis(&self) -> u64 {
        self.0 / 10_000
    }
}

impl fmt::Display for DeliveryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlates an outbound publish with its completion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublishId(u64);

impl PublishId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PublishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}
