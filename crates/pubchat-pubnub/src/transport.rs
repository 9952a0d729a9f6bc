//! PubNub Transport Task
//!
//! Bridges the session's effects onto the PubNub HTTP API. The subscription
//! runs as its own long-poll task; every publish gets a short-lived task that
//! reports `Event::PublishCompleted`.

use crate::client::PubNubClient;
use crate::config::PubNubConfig;
use crate::error::PubNubError;
use crate::wire::{Cursor, SubscribeResponse};
use async_trait::async_trait;
use pubchat_core::{
    ChannelName, ChatError, ChatResult, ClientId, Effect, EffectReceiver, Event, EventSender,
    PublishError, PublishId, StatusEvent, TransportError, TransportTask,
};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

pub struct PubNubTransport {
    client: PubNubClient,
    event_sender: Option<EventSender>,
    effect_receiver: Option<EffectReceiver>,
}

impl PubNubTransport {
    pub fn new(config: PubNubConfig, client_id: ClientId) -> ChatResult<Self> {
        Ok(Self {
            client: PubNubClient::new(config, client_id)?,
            event_sender: None,
            effect_receiver: None,
        })
    }

    fn channels_not_attached(&self) -> ChatError {
        ChatError::Transport(TransportError::ChannelsNotAttached {
            transport: self.name().to_string(),
        })
    }
}

#[async_trait]
impl TransportTask for PubNubTransport {
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

        info!(
            client_id = %self.client.client_id(),
            origin = %self.client.config().origin,
            "Starting PubNub transport"
        );

        let mut channels: Vec<ChannelName> = Vec::new();
        let mut subscription: Option<JoinHandle<()>> = None;

        loop {
            match effect_receiver.recv().await {
                Ok(Effect::Subscribe {
                    channels: requested,
                    with_presence,
                }) => {
                    merge_channels(&mut channels, requested, with_presence);
                    if let Some(previous) = subscription.take() {
                        debug!("Restarting subscription with the new channel list");
                        previous.abort();
                    }
                    subscription = Some(tokio::spawn(subscribe_loop(
                        self.client.clone(),
                        channels.clone(),
                        event_sender.clone(),
                        self.client.config().reconnect_delay(),
                    )));
                }
                Ok(Effect::Publish {
                    channel,
                    payload,
                    publish_id,
                }) => {
                    tokio::spawn(publish_once(
                        self.client.clone(),
                        event_sender.clone(),
                        channel,
                        payload,
                        publish_id,
                    ));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "PubNub transport lagged behind effects");
                }
                Err(RecvError::Closed) => {
                    debug!("Effect channel closed, stopping PubNub transport");
                    break;
                }
            }
        }

        if let Some(subscription) = subscription {
            subscription.abort();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pubnub"
    }
}

/// Add `requested` (and their presence channels) to `channels`, keeping order
fn merge_channels(
    channels: &mut Vec<ChannelName>,
    requested: Vec<ChannelName>,
    with_presence: bool,
) {
    for channel in requested {
        let presence = with_presence.then(|| channel.presence());
        for candidate in std::iter::once(channel).chain(presence) {
            if !channels.contains(&candidate) {
                channels.push(candidate);
            }
        }
    }
}

async fn publish_once(
    client: PubNubClient,
    event_sender: EventSender,
    channel: ChannelName,
    payload: Value,
    publish_id: PublishId,
) {
    let result = client
        .publish(&channel, &payload)
        .await
        .map_err(PublishError::from);
    if event_sender
        .send(Event::PublishCompleted { publish_id, result })
        .await
        .is_err()
    {
        debug!(publish_id = %publish_id, "Session gone before publish completed");
    }
}

/// One long-poll round trip of a subscription
#[async_trait]
trait SubscribePoll: Send + Sync + 'static {
    async fn poll(
        &self,
        channels: &[ChannelName],
        cursor: &Cursor,
    ) -> Result<SubscribeResponse, PubNubError>;
}

#[async_trait]
impl SubscribePoll for PubNubClient {
    async fn poll(
        &self,
        channels: &[ChannelName],
        cursor: &Cursor,
    ) -> Result<SubscribeResponse, PubNubError> {
        self.subscribe(channels, cursor).await
    }
}

/// Long-poll until the session goes away, resuming from the last timetoken
async fn subscribe_loop<P: SubscribePoll>(
    source: P,
    channels: Vec<ChannelName>,
    event_sender: EventSender,
    reconnect_delay: Duration,
) {
    let mut cursor = Cursor::default();
    let mut connected = false;

    loop {
        match source.poll(&channels, &cursor).await {
            Ok(response) => {
                if !connected {
                    connected = true;
                    info!(channels = channels.len(), "PubNub subscription connected");
                    if !send_status(&event_sender, StatusEvent::Connected(true)).await {
                        return;
                    }
                }

                for envelope in response.m {
                    let channel = envelope.channel();
                    let token = envelope.token();
                    let event = Event::MessageReceived {
                        channel,
                        payload: envelope.d,
                        token,
                    };
                    if event_sender.send(event).await.is_err() {
                        debug!("Session gone, stopping subscription");
                        return;
                    }
                }
                cursor = response.t;
            }
            Err(e) => {
                warn!("PubNub subscribe failed: {}", e);
                if !send_status(&event_sender, StatusEvent::Error(e.to_string())).await {
                    return;
                }
                if connected {
                    connected = false;
                    if !send_status(&event_sender, StatusEvent::Connected(false)).await {
                        return;
                    }
                }
                sleep(reconnect_delay).await;
            }
        }
    }
}

/// False once the session is gone
async fn send_status(event_sender: &EventSender, status: StatusEvent) -> bool {
    let delivered = event_sender.send(Event::Status(status)).await.is_ok();
    if !delivered {
        debug!("Session gone, stopping subscription");
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::parse_subscribe_response;
    use serde_json::json;
    use pubchat_core::{create_event_channel, ChannelConfig, EventReceiver};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::time::timeout;

    /// Replays canned poll results and records the cursor of every poll
    struct ScriptedPolls {
        responses: Mutex<VecDeque<Result<SubscribeResponse, PubNubError>>>,
        cursors: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SubscribePoll for ScriptedPolls {
        async fn poll(
            &self,
            _channels: &[ChannelName],
            cursor: &Cursor,
        ) -> Result<SubscribeResponse, PubNubError> {
            self.cursors.lock().unwrap().push(cursor.t.clone());
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }
    }

    fn response(body: &str) -> Result<SubscribeResponse, PubNubError> {
        Ok(parse_subscribe_response(body).unwrap())
    }

    async fn next_status(events: &mut EventReceiver) -> Event {
        timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("event within timeout")
            .expect("event channel open")
    }

    #[test]
    fn presence_channels_follow_their_channel() {
        let mut channels = Vec::new();
        merge_channels(&mut channels, vec![ChannelName::new("the_guide")], true);
        merge_channels(&mut channels, vec![ChannelName::new("the_guide")], true);

        assert_eq!(
            channels,
            vec![
                ChannelName::new("the_guide"),
                ChannelName::new("the_guide-pnpres")
            ]
        );
    }

    #[test]
    fn no_presence_channel_without_presence() {
        let mut channels = Vec::new();
        merge_channels(&mut channels, vec![ChannelName::new("a"), ChannelName::new("b")], false);
        assert_eq!(channels, vec![ChannelName::new("a"), ChannelName::new("b")]);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = PubNubConfig {
            publish_key: String::new(),
            ..PubNubConfig::default()
        };
        assert!(matches!(
            PubNubTransport::new(config, ClientId::new("x")),
            Err(ChatError::Transport(TransportError::InvalidConfiguration { .. }))
        ));
    }

    #[tokio::test]
    async fn run_without_channels_fails() {
        let mut transport =
            PubNubTransport::new(PubNubConfig::default(), ClientId::new("x")).unwrap();
        assert!(matches!(
            transport.run().await,
            Err(ChatError::Transport(TransportError::ChannelsNotAttached { .. }))
        ));
    }

    #[tokio::test]
    async fn failed_poll_reports_disconnect_and_resumes_from_last_cursor() {
        let cursors = Arc::new(Mutex::new(Vec::new()));
        let source = ScriptedPolls {
            responses: Mutex::new(VecDeque::from(vec![
                response(r#"{"t":{"t":"100","r":1},"m":[]}"#),
                response(
                    &json!({
                        "t": {"t": "200", "r": 1},
                        "m": [{"c": "the_guide", "d": {"update": "hi"}, "p": {"t": "150", "r": 1}}]
                    })
                    .to_string(),
                ),
                Err(PubNubError::Api {
                    status: 502,
                    message: "Bad Gateway".into(),
                }),
                response(r#"{"t":{"t":"300","r":1},"m":[]}"#),
            ])),
            cursors: Arc::clone(&cursors),
        };
        let (event_sender, mut events) = create_event_channel(&ChannelConfig::testing());
        let task = tokio::spawn(subscribe_loop(
            source,
            vec![ChannelName::new("the_guide")],
            event_sender,
            Duration::from_millis(1),
        ));

        assert!(matches!(
            next_status(&mut events).await,
            Event::Status(StatusEvent::Connected(true))
        ));
        match next_status(&mut events).await {
            Event::MessageReceived { channel, payload, .. } => {
                assert_eq!(channel, ChannelName::new("the_guide"));
                assert_eq!(payload["update"], "hi");
            }
            other => panic!("Expected message, got {:?}", other),
        }
        assert!(matches!(
            next_status(&mut events).await,
            Event::Status(StatusEvent::Error(_))
        ));
        assert!(matches!(
            next_status(&mut events).await,
            Event::Status(StatusEvent::Connected(false))
        ));
        assert!(matches!(
            next_status(&mut events).await,
            Event::Status(StatusEvent::Connected(true))
        ));

        // The poll after the 300 response is parked forever; wait for it
        timeout(Duration::from_secs(1), async {
            while cursors.lock().unwrap().len() < 5 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("loop keeps polling");
        assert_eq!(
            *cursors.lock().unwrap(),
            vec!["0", "100", "200", "200", "300"]
        );

        task.abort();
    }
}
