//! CSP Channel Communication Protocol Types
//!
//! All traffic between the UI, the session loop and the transports flows
//! through these message types.

use crate::errors::PublishError;
use crate::types::{ChannelName, DeliveryToken, Message, PublishId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ----------------------------------------------------------------------------
// Command: UI → Session
// ----------------------------------------------------------------------------

/// Commands sent from the UI to the session loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Publish user-entered text on the session's channel
    Publish { text: String },
    /// Stop the session loop
    Shutdown,
}

// ----------------------------------------------------------------------------
// Event: Transport → Session
// ----------------------------------------------------------------------------

/// Connection status reported by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    Connected(bool),
    Error(String),
}

/// Events sent from transport tasks to the session loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A payload arrived on a subscribed channel
    MessageReceived {
        channel: ChannelName,
        payload: Value,
        token: Option<DeliveryToken>,
    },
    /// Connection status changed or the transport hit an error
    Status(StatusEvent),
    /// An earlier `Effect::Publish` resolved
    PublishCompleted {
        publish_id: PublishId,
        result: Result<DeliveryToken, PublishError>,
    },
}

// ----------------------------------------------------------------------------
// Effect: Session → Transport
// ----------------------------------------------------------------------------

/// Side effects the session asks its transports to carry out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Effect {
    /// Begin receiving events for the given channels
    Subscribe {
        channels: Vec<ChannelName>,
        with_presence: bool,
    },
    /// Deliver an encoded envelope on a channel
    Publish {
        channel: ChannelName,
        payload: Value,
        publish_id: PublishId,
    },
}

// ----------------------------------------------------------------------------
// AppEvent: Session → UI
// ----------------------------------------------------------------------------

/// State changes the UI needs to know about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// The listener is now bound and the subscription has been requested
    SessionBound { channel: ChannelName },
    /// A message was appended to the store
    MessageAppended { message: Message },
}
