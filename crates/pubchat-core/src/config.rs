//! Configuration
//!
//! Channel buffer sizing for the CSP plumbing and the identity of the chat
//! session. Both are serde-friendly so front ends can load them from files.

use crate::errors::{ChatError, Result};
use crate::types::{ChannelName, ClientId};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Configuration for CSP channel buffer sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Buffer size for Command channels (UI → session)
    pub command_buffer_size: usize,
    /// Buffer size for Event channels (transport → session)
    pub event_buffer_size: usize,
    /// Buffer size for Effect channels (session → transports)
    pub effect_buffer_size: usize,
    /// Buffer size for AppEvent channels (session → UI)
    pub app_event_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,   // UI commands are infrequent
            event_buffer_size: 128,    // Network events can be bursty
            effect_buffer_size: 64,    // Effects are processed quickly
            app_event_buffer_size: 64, // UI updates need responsiveness
        }
    }
}

impl ChannelConfig {
    /// Small buffers so tests exercise back-pressure paths
    pub fn testing() -> Self {
        Self {
            command_buffer_size: 16,
            event_buffer_size: 16,
            effect_buffer_size: 16,
            app_event_buffer_size: 256,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("command_buffer_size", self.command_buffer_size),
            ("event_buffer_size", self.event_buffer_size),
            ("effect_buffer_size", self.effect_buffer_size),
            ("app_event_buffer_size", self.app_event_buffer_size),
        ];
        match sizes.iter().find(|(_, size)| *size == 0) {
            Some((name, _)) => Err(ChatError::config_error(format!("{name} must be non-zero"))),
            None => Ok(()),
        }
    }
}

// ----------------------------------------------------------------------------
// Session Configuration
// ----------------------------------------------------------------------------

/// Identity and channel of a chat session; fixed for the session's lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The one channel this session subscribes and publishes to
    pub channel: ChannelName,
    /// Identifier presented to the network
    pub client_id: ClientId,
    /// Sender name put in outbound envelopes. `None` sends the placeholder.
    pub display_name: Option<String>,
    /// Request presence tracking alongside the subscription
    pub with_presence: bool,
    /// CSP channel sizing
    pub channels: ChannelConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel: ChannelName::new("the_guide"),
            client_id: ClientId::generate(),
            display_name: None,
            with_presence: true,
            channels: ChannelConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Configuration for tests on the given channel
    pub fn testing(channel: &str) -> Self {
        Self {
            channel: ChannelName::new(channel),
            channels: ChannelConfig::testing(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel.as_str().trim().is_empty() {
            return Err(ChatError::config_error("channel name must not be empty"));
        }
        if self.channel.is_presence() {
            return Err(ChatError::config_error(format!(
                "channel {} is a presence channel",
                self.channel
            )));
        }
        if self.client_id.as_str().trim().is_empty() {
            return Err(ChatError::config_error("client id must not be empty"));
        }
        if matches!(&self.display_name, Some(name) if name.trim().is_empty()) {
            return Err(ChatError::config_error("display name must not be blank"));
        }
        self.channels.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.channel.as_str(), "the_guide");
        assert!(config.with_presence);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_presence_channel() {
        let config = SessionConfig {
            channel: ChannelName::new("lobby-pnpres"),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_buffers() {
        let config = ChannelConfig {
            event_buffer_size: 0,
            ..ChannelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChatError::Configuration { .. })
        ));
    }
}
