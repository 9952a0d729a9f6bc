//! Loopback Transport
//!
//! `TransportTask` implementation backed by a `LoopbackNetwork`.

use crate::network::{Delivery, LoopbackNetwork};
use async_trait::async_trait;
use pubchat_core::{
    ChannelName, ChatError, ClientId, Effect, EffectReceiver, Event, EventSender, PublishId,
    Result as ChatResult, StatusEvent, TransportError, TransportTask,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::pin::Pin;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{sleep, Duration, Sleep};
use tracing::{debug, info, warn};

/// Behavior knobs for a loopback transport
#[derive(Debug, Clone)]
pub struct LoopbackConfig {
    /// Delay before a publish reaches the network
    pub publish_latency: Duration,
    /// Delay between a subscribe request and the subscription going live.
    /// Publishes in between are not delivered back to this transport.
    pub subscribe_latency: Duration,
    /// Announce a presence join on the side channel when subscribing with presence
    pub announce_presence: bool,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            publish_latency: Duration::from_millis(1),
            subscribe_latency: Duration::ZERO,
            announce_presence: true,
        }
    }
}

/// Transport task speaking to an in-memory network
pub struct LoopbackTransport {
    network: LoopbackNetwork,
    client_id: ClientId,
    config: LoopbackConfig,
    event_sender: Option<EventSender>,
    effect_receiver: Option<EffectReceiver>,
}

impl LoopbackTransport {
    pub fn new(network: LoopbackNetwork, client_id: ClientId) -> Self {
        Self::with_config(network, client_id, LoopbackConfig::default())
    }

    pub fn with_config(
        network: LoopbackNetwork,
        client_id: ClientId,
        config: LoopbackConfig,
    ) -> Self {
        Self {
            network,
            client_id,
            config,
            event_sender: None,
            effect_receiver: None,
        }
    }

    fn channels_not_attached(&self) -> ChatError {
        ChatError::Transport(TransportError::ChannelsNotAttached {
            transport: self.name().to_string(),
        })
    }
}

#[async_trait]
impl TransportTask for LoopbackTransport {
    fn attach_channels(
        &mut self,
        event_sender: EventSender,
        effect_receiver: EffectReceiver,
    ) -> ChatResult<()> {
        self.event_sender = Some(event_sender);
        self.effect_receiver = Some(effect_receiver);
        Ok(())
    }

    async fn run(&mut self) -> ChatResult<()> {
        let event_sender = self
            .event_sender
            .clone()
            .ok_or_else(|| self.channels_not_attached())?;
        let mut effect_receiver = self
            .effect_receiver
            .take()
            .ok_or_else(|| self.channels_not_attached())?;

        info!(client_id = %self.client_id, "Starting loopback transport");

        let mut deliveries: Option<broadcast::Receiver<Delivery>> = None;
        let mut subscribed: HashSet<ChannelName> = HashSet::new();
        let mut joining: Option<Pin<Box<Sleep>>> = None;
        let mut announce: Vec<ChannelName> = Vec::new();

        loop {
            tokio::select! {
                effect = effect_receiver.recv() => match effect {
                    Ok(Effect::Subscribe { channels, with_presence }) => {
                        for channel in channels {
                            if with_presence {
                                subscribed.insert(channel.presence());
                                if self.config.announce_presence {
                                    announce.push(channel.presence());
                                }
                            }
                            subscribed.insert(channel);
                        }
                        if self.config.subscribe_latency.is_zero() {
                            if !self.join(&event_sender, &mut deliveries, &mut announce).await {
                                break;
                            }
                        } else {
                            joining = Some(Box::pin(sleep(self.config.subscribe_latency)));
                        }
                    }
                    Ok(Effect::Publish { channel, payload, publish_id }) => {
                        self.spawn_publish(event_sender.clone(), channel, payload, publish_id);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Loopback transport lagged behind effects");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Effect channel closed, stopping loopback transport");
                        break;
                    }
                },
                delivery = next_delivery(&mut deliveries) => match delivery {
                    Ok(delivery) => {
                        if !subscribed.contains(&delivery.channel) {
                            continue;
                        }
                        let event = Event::MessageReceived {
                            channel: delivery.channel,
                            payload: delivery.payload,
                            token: Some(delivery.token),
                        };
                        if event_sender.send(event).await.is_err() {
                            debug!("Session gone, stopping loopback transport");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        let _ = event_sender
                            .send(Event::Status(StatusEvent::Error(format!(
                                "missed {skipped} deliveries"
                            ))))
                            .await;
                    }
                    Err(RecvError::Closed) => break,
                },
                () = until_joined(&mut joining) => {
                    joining = None;
                    if !self.join(&event_sender, &mut deliveries, &mut announce).await {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "loopback"
    }
}

impl LoopbackTransport {
    /// Open the delivery stream and report the subscription live. False once
    /// the session is gone.
    async fn join(
        &self,
        event_sender: &EventSender,
        deliveries: &mut Option<broadcast::Receiver<Delivery>>,
        announcements: &mut Vec<ChannelName>,
    ) -> bool {
        if deliveries.is_none() {
            *deliveries = Some(self.network.subscribe());
        }
        for channel in announcements.drain(..) {
            self.network.inject(channel, self.presence_join());
        }
        debug!(client_id = %self.client_id, "Loopback subscription live");
        event_sender
            .send(Event::Status(StatusEvent::Connected(true)))
            .await
            .is_ok()
    }

    fn presence_join(&self) -> Value {
        json!({ "action": "join", "uuid": self.client_id.as_str(), "occupancy": 1 })
    }

    /// Publish off the main loop and report the outcome as an event
    fn spawn_publish(
        &self,
        event_sender: EventSender,
        channel: ChannelName,
        payload: Value,
        publish_id: PublishId,
    ) {
        let network = self.network.clone();
        let latency = self.config.publish_latency;
        tokio::spawn(async move {
            sleep(latency).await;
            let result = network.publish(channel, payload).await;
            if event_sender
                .send(Event::PublishCompleted { publish_id, result })
                .await
                .is_err()
            {
                debug!(publish_id = %publish_id, "Session gone before publish completed");
            }
        });
    }
}

async fn until_joined(joining: &mut Option<Pin<Box<Sleep>>>) {
    match joining {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_delivery(
    deliveries: &mut Option<broadcast::Receiver<Delivery>>,
) -> Result<Delivery, RecvError> {
    match deliveries {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubchat_core::{create_effect_channel, create_event_channel, ChannelConfig};
    use tokio::time::timeout;

    async fn recv_event(receiver: &mut pubchat_core::EventReceiver) -> Event {
        timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("event within timeout")
            .expect("event channel open")
    }

    #[tokio::test]
    async fn echoes_own_publish_after_subscribing() {
        let network = LoopbackNetwork::new();
        let config = ChannelConfig::testing();
        let (event_sender, mut events) = create_event_channel(&config);
        let (effects, effect_receiver) = create_effect_channel(&config);

        let mut transport = LoopbackTransport::with_config(
            network.clone(),
            ClientId::new("tester"),
            LoopbackConfig {
                announce_presence: false,
                ..LoopbackConfig::default()
            },
        );
        transport.attach_channels(event_sender, effect_receiver).unwrap();
        let task = tokio::spawn(async move { transport.run().await });

        let channel = ChannelName::new("the_guide");
        effects
            .send(Effect::Subscribe {
                channels: vec![channel.clone()],
                with_presence: false,
            })
            .unwrap();
        assert!(matches!(
            recv_event(&mut events).await,
            Event::Status(StatusEvent::Connected(true))
        ));

        effects
            .send(Effect::Publish {
                channel: channel.clone(),
                payload: json!({"update": "hi", "entry": "User"}),
                publish_id: PublishId::new(7),
            })
            .unwrap();

        let mut saw_echo = false;
        let mut saw_completion = false;
        while !(saw_echo && saw_completion) {
            match recv_event(&mut events).await {
                Event::MessageReceived { channel: c, payload, .. } => {
                    assert_eq!(c, channel);
                    assert_eq!(payload["update"], "hi");
                    saw_echo = true;
                }
                Event::PublishCompleted { publish_id, result } => {
                    assert_eq!(publish_id, PublishId::new(7));
                    assert!(result.is_ok());
                    saw_completion = true;
                }
                other => panic!("Unexpected event {:?}", other),
            }
        }

        task.abort();
    }

    #[tokio::test]
    async fn publish_before_slow_subscription_is_not_echoed() {
        let network = LoopbackNetwork::new();
        let config = ChannelConfig::testing();
        let (event_sender, mut events) = create_event_channel(&config);
        let (effects, effect_receiver) = create_effect_channel(&config);

        let mut transport = LoopbackTransport::with_config(
            network.clone(),
            ClientId::new("tester"),
            LoopbackConfig {
                subscribe_latency: Duration::from_millis(200),
                announce_presence: false,
                ..LoopbackConfig::default()
            },
        );
        transport.attach_channels(event_sender, effect_receiver).unwrap();
        let task = tokio::spawn(async move { transport.run().await });

        let channel = ChannelName::new("the_guide");
        effects
            .send(Effect::Subscribe {
                channels: vec![channel.clone()],
                with_presence: false,
            })
            .unwrap();
        effects
            .send(Effect::Publish {
                channel: channel.clone(),
                payload: json!({"update": "too early", "entry": "User"}),
                publish_id: PublishId::new(1),
            })
            .unwrap();

        // The publish lands first; the subscription goes live after it
        assert!(matches!(
            recv_event(&mut events).await,
            Event::PublishCompleted { result: Ok(_), .. }
        ));
        assert!(matches!(
            recv_event(&mut events).await,
            Event::Status(StatusEvent::Connected(true))
        ));
        assert_eq!(network.publishes().await.len(), 1);
        assert!(timeout(Duration::from_millis(100), events.recv()).await.is_err());

        task.abort();
    }

    #[tokio::test]
    async fn run_without_channels_fails() {
        let mut transport = LoopbackTransport::new(LoopbackNetwork::new(), ClientId::new("x"));
        assert!(matches!(
            transport.run().await,
            Err(ChatError::Transport(TransportError::ChannelsNotAttached { .. }))
        ));
    }
}
