//! PubChat Runtime
//!
//! Sets up and coordinates the session's components: the channels, the
//! transport tasks and the session loop.
//!
//! ```rust,no_run
//! use pubchat_harness::{LoopbackNetwork, LoopbackTransport};
//! use pubchat_runtime::{ChatRuntime, SessionConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::default();
//! let network = LoopbackNetwork::new();
//!
//! let mut runtime = ChatRuntime::new(config.clone());
//! runtime.add_transport(LoopbackTransport::new(network, config.client_id.clone()))?;
//! runtime.start()?;
//!
//! let chat = runtime.handle()?;
//! chat.publish("Hello There.")?;
//! # Ok(())
//! # }
//! ```

use crate::handle::ChatHandle;
use crate::logic::SessionLogicTask;
use pubchat_core::{
    create_app_event_channel, create_command_channel, create_effect_channel,
    create_effect_receiver, create_event_channel, AppEventReceiver, ChatError, ChatResult,
    SessionConfig, TransportError, TransportTask,
};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

/// How long `shutdown` waits for the session loop to drain
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ----------------------------------------------------------------------------
// Chat Runtime
// ----------------------------------------------------------------------------

/// Runtime for one chat session
pub struct ChatRuntime {
    config: SessionConfig,
    /// Registered transport tasks (before start)
    pending_transports: Vec<Box<dyn TransportTask>>,
    /// Running transport task handles (after start)
    transport_handles: Vec<(&'static str, JoinHandle<ChatResult<()>>)>,
    session_handle: Option<JoinHandle<ChatResult<()>>>,
    chat_handle: Option<ChatHandle>,
    app_event_receiver: Option<AppEventReceiver>,
    running: bool,
}

impl ChatRuntime {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            pending_transports: Vec::new(),
            transport_handles: Vec::new(),
            session_handle: None,
            chat_handle: None,
            app_event_receiver: None,
            running: false,
        }
    }

    /// Runtime with small buffers on the given channel
    pub fn for_testing(channel: &str) -> Self {
        Self::new(SessionConfig::testing(channel))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Add a transport task. Transports must be added before `start()`.
    pub fn add_transport<T: TransportTask + 'static>(&mut self, transport: T) -> ChatResult<()> {
        if self.running {
            return Err(ChatError::Transport(TransportError::InvalidConfiguration {
                reason: "Cannot add transports to a running runtime".to_string(),
            }));
        }
        info!(transport = transport.name(), "Registered transport");
        self.pending_transports.push(Box::new(transport));
        Ok(())
    }

    /// Spawn the transports and the session loop
    pub fn start(&mut self) -> ChatResult<()> {
        if self.running {
            return Err(ChatError::config_error("Runtime already started"));
        }
        self.config.validate()?;
        if self.pending_transports.is_empty() {
            warn!("Starting session without any transport");
        }

        let channels = &self.config.channels;
        let (command_sender, command_receiver) = create_command_channel(channels);
        let (event_sender, event_receiver) = create_event_channel(channels);
        let (effect_sender, _effect_receiver) = create_effect_channel(channels);
        let (app_event_sender, app_event_receiver) = create_app_event_channel(channels);

        // Transports subscribe to effects before the session emits its first one
        for mut transport in self.pending_transports.drain(..) {
            let name = transport.name();
            let effect_receiver = create_effect_receiver(&effect_sender);
            transport.attach_channels(event_sender.clone(), effect_receiver)?;
            let handle = tokio::spawn(async move {
                let result = transport.run().await;
                if let Err(e) = &result {
                    error!(transport = name, "Transport task failed: {}", e);
                }
                result
            });
            self.transport_handles.push((name, handle));
        }
        // Only transports hold event senders now
        drop(event_sender);

        let mut session = SessionLogicTask::new(
            self.config.clone(),
            command_receiver,
            event_receiver,
            effect_sender,
            app_event_sender,
        )?;
        self.chat_handle = Some(ChatHandle::new(
            self.config.channel.clone(),
            command_sender,
            session.store_observer(),
            session.connection_observer(),
        ));
        self.session_handle = Some(tokio::spawn(async move { session.run().await }));
        self.app_event_receiver = Some(app_event_receiver);
        self.running = true;

        info!(
            channel = %self.config.channel,
            transports = self.transport_handles.len(),
            "Chat runtime started"
        );
        Ok(())
    }

    /// Handle for the UI; available once started
    pub fn handle(&self) -> ChatResult<ChatHandle> {
        self.chat_handle
            .clone()
            .ok_or_else(|| ChatError::config_error("Runtime not started"))
    }

    /// Take the app event stream. Only the first caller gets it.
    pub fn take_app_event_receiver(&mut self) -> Option<AppEventReceiver> {
        self.app_event_receiver.take()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the session loop, then the transports
    pub async fn shutdown(&mut self) -> ChatResult<()> {
        if !self.running {
            return Ok(());
        }
        info!("Shutting down chat runtime");

        if let Some(handle) = self.chat_handle.take() {
            if let Err(e) = handle.request_shutdown().await {
                warn!("Session already stopped: {}", e);
            }
        }

        let mut session_result = Ok(());
        if let Some(session) = self.session_handle.take() {
            match timeout(SHUTDOWN_GRACE, session).await {
                Ok(Ok(result)) => session_result = result,
                Ok(Err(join_error)) => {
                    error!("Session task panicked or was cancelled: {}", join_error)
                }
                Err(_) => warn!("Session task did not stop within {:?}", SHUTDOWN_GRACE),
            }
        }

        for (name, handle) in self.transport_handles.drain(..) {
            handle.abort();
            info!(transport = name, "Transport stopped");
        }

        self.running = false;
        session_result
    }
}

impl Drop for ChatRuntime {
    fn drop(&mut self) {
        for (_, handle) in &self.transport_handles {
            handle.abort();
        }
        if let Some(session) = &self.session_handle {
            session.abort();
        }
    }
}
