//! Subscription Listener
//!
//! Binds the session to one channel and turns inbound transport events into
//! display messages. Decoding is lossy: a payload that fails to decode is
//! logged and dropped so a misbehaving client cannot stall the session.

use crate::channel::{Effect, StatusEvent};
use crate::codec;
use crate::errors::{ListenerError, Result};
use crate::types::{ChannelName, Message};
use serde_json::Value;
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// Listener State
// ----------------------------------------------------------------------------

/// Binding state. There is no transition back to `Unbound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerState {
    Unbound,
    Bound { channel: ChannelName },
}

/// Counters kept by the listener
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub messages_decoded: u64,
    pub decode_failures: u64,
    pub foreign_events_dropped: u64,
    pub status_events: u64,
    pub status_errors: u64,
}

// ----------------------------------------------------------------------------
// Subscription Listener
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct SubscriptionListener {
    state: ListenerState,
    connected: bool,
    stats: ListenerStats,
}

impl Default for SubscriptionListener {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionListener {
    pub fn new() -> Self {
        Self {
            state: ListenerState::Unbound,
            connected: false,
            stats: ListenerStats::default(),
        }
    }

    /// Transition `Unbound → Bound` and produce the subscribe request to issue
    pub fn bind(&mut self, channel: ChannelName, with_presence: bool) -> Result<Effect> {
        if let ListenerState::Bound { channel } = &self.state {
            return Err(ListenerError::AlreadyBound {
                channel: channel.clone(),
            }
            .into());
        }

        info!(channel = %channel, with_presence, "Binding subscription listener");
        self.state = ListenerState::Bound {
            channel: channel.clone(),
        };

        Ok(Effect::Subscribe {
            channels: vec![channel],
            with_presence,
        })
    }

    /// Handle an inbound message event, returning the display message to append
    pub fn handle_message(&mut self, channel: &ChannelName, payload: &Value) -> Option<Message> {
        let bound = match &self.state {
            ListenerState::Bound { channel } => channel,
            ListenerState::Unbound => {
                debug!(channel = %channel, "Dropping event received while unbound");
                self.stats.foreign_events_dropped += 1;
                return None;
            }
        };

        if channel != bound {
            // Includes the presence side channel, which is requested but not consumed
            debug!(channel = %channel, bound = %bound, "Dropping event for another channel");
            self.stats.foreign_events_dropped += 1;
            return None;
        }

        match codec::decode(payload) {
            Ok(envelope) => {
                self.stats.messages_decoded += 1;
                Some(Message::received(&envelope))
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Dropping undecodable payload");
                self.stats.decode_failures += 1;
                None
            }
        }
    }

    /// Observe a transport status change. Reconnection is the transport's job.
    pub fn handle_status(&mut self, status: &StatusEvent) {
        self.stats.status_events += 1;
        match status {
            StatusEvent::Connected(connected) => {
                self.connected = *connected;
                info!(connected = *connected, "Status Success");
            }
            StatusEvent::Error(description) => {
                self.stats.status_errors += 1;
                warn!(error = %description, "Status Error");
            }
        }
    }

    pub fn state(&self) -> &ListenerState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, ListenerState::Bound { .. })
    }

    /// Last connection state reported by the transport
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn stats(&self) -> &ListenerStats {
        &self.stats
    }
}
