//! PubNub Configuration

use pubchat_core::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Keys and timing for the PubNub transport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PubNubConfig {
    pub publish_key: String,
    pub subscribe_key: String,
    /// Base URL of the PubNub edge
    pub origin: String,
    /// Presence heartbeat announced on each subscribe request
    pub heartbeat_secs: u32,
    /// Must exceed the server's long-poll hold time
    pub request_timeout_secs: u64,
    /// Pause after a failed subscribe request
    pub reconnect_delay_secs: u64,
}

impl Default for PubNubConfig {
    fn default() -> Self {
        Self {
            publish_key: "demo".to_string(),
            subscribe_key: "demo".to_string(),
            origin: "https://ps.pndsn.com".to_string(),
            heartbeat_secs: 300,
            request_timeout_secs: 310,
            reconnect_delay_secs: 3,
        }
    }
}

impl PubNubConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Parsed origin
    pub fn origin_url(&self) -> ChatResult<Url> {
        let url = Url::parse(&self.origin).map_err(|e| {
            ChatError::invalid_transport_config(format!("origin {}: {}", self.origin, e))
        })?;
        if url.cannot_be_a_base() {
            return Err(ChatError::invalid_transport_config(format!(
                "origin {} cannot carry a path",
                self.origin
            )));
        }
        Ok(url)
    }

    pub fn validate(&self) -> ChatResult<()> {
        if self.publish_key.trim().is_empty() {
            return Err(ChatError::invalid_transport_config("publish key must not be empty"));
        }
        if self.subscribe_key.trim().is_empty() {
            return Err(ChatError::invalid_transport_config("subscribe key must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ChatError::invalid_transport_config(
                "request timeout must be non-zero",
            ));
        }
        self.origin_url().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_demo_keys() {
        let config = PubNubConfig::default();
        assert_eq!(config.publish_key, "demo");
        assert_eq!(config.subscribe_key, "demo");
        assert!(config.request_timeout() > Duration::from_secs(config.heartbeat_secs as u64));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let blank_key = PubNubConfig {
            subscribe_key: " ".to_string(),
            ..PubNubConfig::default()
        };
        assert!(blank_key.validate().is_err());

        let bad_origin = PubNubConfig {
            origin: "not a url".to_string(),
            ..PubNubConfig::default()
        };
        assert!(bad_origin.validate().is_err());

        let mailto = PubNubConfig {
            origin: "mailto:someone@example.com".to_string(),
            ..PubNubConfig::default()
        };
        assert!(mailto.validate().is_err());
    }
}
