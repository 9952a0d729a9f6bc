//! Chat application wiring
//!
//! Builds a `ChatRuntime` with either the PubNub transport or, when offline,
//! a private loopback network.

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use pubchat_core::{EntryUpdate, DEFAULT_ENTRY};
use pubchat_harness::{LoopbackNetwork, LoopbackTransport};
use pubchat_pubnub::PubNubTransport;
use pubchat_runtime::{
    AppEventReceiver, ChatError, ChatHandle, ChatRuntime, Message, PublishStatus, TransportTask,
};
use tokio::time::{timeout_at, Duration, Instant};
use tracing::info;

pub struct ChatApp {
    config: AppConfig,
    runtime: ChatRuntime,
}

impl ChatApp {
    /// Start the session with the transport the configuration asks for
    pub fn start(config: AppConfig) -> Result<Self> {
        let client_id = config.session.client_id.clone();

        if config.cli.offline {
            info!("Using offline loopback network");
            let transport = LoopbackTransport::new(LoopbackNetwork::new(), client_id);
            Self::with_transport(config, transport)
        } else {
            info!(origin = %config.pubnub.origin, "Using PubNub transport");
            let transport = PubNubTransport::new(config.pubnub.clone(), client_id)?;
            Self::with_transport(config, transport)
        }
    }

    /// Start the session over an already built transport
    pub fn with_transport<T>(config: AppConfig, transport: T) -> Result<Self>
    where
        T: TransportTask + 'static,
    {
        config.validate()?;
        let mut runtime = ChatRuntime::new(config.session.clone());
        runtime.add_transport(transport)?;
        runtime.start()?;
        Ok(Self { config, runtime })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn handle(&self) -> Result<ChatHandle> {
        Ok(self.runtime.handle()?)
    }

    pub fn take_app_events(&mut self) -> Option<AppEventReceiver> {
        self.runtime.take_app_event_receiver()
    }

    /// Display text our own message will have once it comes back
    pub fn expected_echo(&self, text: &str) -> String {
        let sender = self
            .config
            .session
            .display_name
            .as_deref()
            .unwrap_or(DEFAULT_ENTRY);
        EntryUpdate::with_entry(text, sender).display_text()
    }

    /// Publish `text` once the subscription is live and wait for its echo,
    /// all within `wait`. `None` when the text was blank.
    pub async fn send_and_confirm(&self, text: &str, wait: Duration) -> Result<Option<Message>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let deadline = Instant::now() + wait;
        let handle = self.handle()?;

        // The echo only comes back once the subscription is live
        timeout_at(deadline, handle.wait_connected())
            .await
            .map_err(|_| CliError::ConnectTimeout {
                secs: wait.as_secs(),
            })??;

        let mut observer = handle.observe();
        let baseline = observer.snapshot().len();
        if handle.publish(text)? == PublishStatus::Ignored {
            return Ok(None);
        }

        let expected = self.expected_echo(text);
        let echo = timeout_at(deadline, async {
            loop {
                let snapshot = observer.snapshot();
                if let Some(message) = snapshot[baseline..]
                    .iter()
                    .find(|m| m.message_text == expected)
                {
                    return Some(message.clone());
                }
                observer.changed().await?;
            }
        })
        .await
        .map_err(|_| CliError::EchoTimeout {
            secs: wait.as_secs(),
        })?;

        echo.map(Some).ok_or_else(|| {
            ChatError::channel_error("session stopped before the echo arrived").into()
        })
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.runtime.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubchat_harness::LoopbackConfig;

    fn offline_config(name: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.cli.offline = true;
        config.session.display_name = name.map(str::to_string);
        config
    }

    #[tokio::test]
    async fn echo_text_uses_sender_name() {
        let mut app = ChatApp::start(offline_config(Some("Ford"))).unwrap();
        assert_eq!(app.expected_echo("hi"), "entry: Ford, update: hi");
        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn offline_send_is_confirmed_by_echo() {
        let mut app = ChatApp::start(offline_config(None)).unwrap();

        let echo = app
            .send_and_confirm("Don't panic", Duration::from_secs(5))
            .await
            .unwrap()
            .expect("non-blank text is published");
        assert_eq!(echo.message_type, "received");
        assert_eq!(echo.message_text, "entry: User, update: Don't panic");

        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn blank_send_publishes_nothing() {
        let mut app = ChatApp::start(offline_config(None)).unwrap();

        let echo = app
            .send_and_confirm("   ", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(echo.is_none());
        assert!(app.handle().unwrap().snapshot().is_empty());

        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn send_waits_for_slow_subscription() {
        let config = offline_config(None);
        let transport = LoopbackTransport::with_config(
            LoopbackNetwork::new(),
            config.session.client_id.clone(),
            LoopbackConfig {
                subscribe_latency: Duration::from_millis(300),
                ..LoopbackConfig::default()
            },
        );
        let mut app = ChatApp::with_transport(config, transport).unwrap();

        let echo = app
            .send_and_confirm("mostly harmless", Duration::from_secs(5))
            .await
            .unwrap()
            .expect("non-blank text is published");
        assert_eq!(echo.message_text, "entry: User, update: mostly harmless");

        app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn send_gives_up_when_subscription_never_goes_live() {
        let config = offline_config(None);
        let transport = LoopbackTransport::with_config(
            LoopbackNetwork::new(),
            config.session.client_id.clone(),
            LoopbackConfig {
                subscribe_latency: Duration::from_secs(60),
                ..LoopbackConfig::default()
            },
        );
        let mut app = ChatApp::with_transport(config, transport).unwrap();

        let result = app
            .send_and_confirm("anyone there?", Duration::from_millis(200))
            .await;
        assert!(matches!(result, Err(CliError::ConnectTimeout { .. })));
        assert!(app.handle().unwrap().snapshot().is_empty());

        app.stop().await.unwrap();
    }
}
