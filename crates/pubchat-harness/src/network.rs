//! Loopback Network
//!
//! Shared hub behind every loopback transport: fans publishes out over a
//! broadcast channel and stamps them with increasing delivery tokens.

use pubchat_core::{ChannelName, DeliveryToken, PublishError};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

/// One message as the network fans it out
#[derive(Debug, Clone)]
pub struct Delivery {
    pub channel: ChannelName,
    pub payload: Value,
    pub token: DeliveryToken,
}

/// One publish attempt as seen by the network
#[derive(Debug, Clone)]
pub struct PublishRecord {
    pub channel: ChannelName,
    pub payload: Value,
    pub accepted: bool,
}

struct NetworkState {
    deliveries: broadcast::Sender<Delivery>,
    next_token: AtomicU64,
    reject_publishes: AtomicBool,
    publishes: Mutex<Vec<PublishRecord>>,
}

/// Cheaply cloneable handle to an in-memory pub/sub network
#[derive(Clone)]
pub struct LoopbackNetwork {
    state: Arc<NetworkState>,
}

impl Default for LoopbackNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackNetwork {
    pub fn new() -> Self {
        // Lagging subscribers get told how many deliveries they missed
        let (deliveries, _) = broadcast::channel(1024);
        Self {
            state: Arc::new(NetworkState {
                deliveries,
                next_token: AtomicU64::new(16_000_000_000_000_000),
                reject_publishes: AtomicBool::new(false),
                publishes: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Make subsequent publishes fail (or succeed again)
    pub fn set_reject_publishes(&self, reject: bool) {
        self.state.reject_publishes.store(reject, Ordering::SeqCst);
    }

    /// Publish on behalf of a connected client
    pub async fn publish(
        &self,
        channel: ChannelName,
        payload: Value,
    ) -> Result<DeliveryToken, PublishError> {
        let accepted = !self.state.reject_publishes.load(Ordering::SeqCst);
        self.state.publishes.lock().await.push(PublishRecord {
            channel: channel.clone(),
            payload: payload.clone(),
            accepted,
        });

        if !accepted {
            warn!(channel = %channel, "Loopback network rejecting publish");
            return Err(PublishError::Rejected {
                reason: "publishes disabled on loopback network".to_string(),
            });
        }

        Ok(self.fan_out(channel, payload))
    }

    /// Deliver a raw payload as if another client had published it
    pub fn inject(&self, channel: ChannelName, payload: Value) -> DeliveryToken {
        self.fan_out(channel, payload)
    }

    /// Every publish attempt so far, in order
    pub async fn publishes(&self) -> Vec<PublishRecord> {
        self.state.publishes.lock().await.clone()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.state.deliveries.subscribe()
    }

    fn fan_out(&self, channel: ChannelName, payload: Value) -> DeliveryToken {
        let token = DeliveryToken::new(self.state.next_token.fetch_add(1, Ordering::SeqCst));
        let delivery = Delivery {
            channel,
            payload,
            token,
        };
        if self.state.deliveries.send(delivery).is_err() {
            debug!(token = %token, "No subscribers for delivery");
        }
        token
    }
}
