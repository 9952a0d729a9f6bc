//! UI Boundary
//!
//! `ChatHandle` is what a front end holds: it reads the message list and
//! submits text. Every call returns immediately.

use pubchat_core::{
    ChannelName, ChatError, ChatResult, Command, CommandSender, PublishError, Snapshot,
    StoreObserver,
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;

/// Outcome of a publish request, as far as the caller can know it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// The text was handed to the session; clear the input field
    Initiated,
    /// Blank text, nothing was sent
    Ignored,
}

/// Cheaply cloneable handle to a running chat session
#[derive(Debug, Clone)]
pub struct ChatHandle {
    channel: ChannelName,
    command_sender: CommandSender,
    observer: StoreObserver,
    connection: watch::Receiver<bool>,
}

impl ChatHandle {
    pub(crate) fn new(
        channel: ChannelName,
        command_sender: CommandSender,
        observer: StoreObserver,
        connection: watch::Receiver<bool>,
    ) -> Self {
        Self {
            channel,
            command_sender,
            observer,
            connection,
        }
    }

    /// Request a publish. Delivery is confirmed (or not) later and only logged.
    pub fn publish(&self, text: &str) -> ChatResult<PublishStatus> {
        if text.trim().is_empty() {
            return Ok(PublishStatus::Ignored);
        }

        match self.command_sender.try_send(Command::Publish {
            text: text.to_string(),
        }) {
            Ok(()) => Ok(PublishStatus::Initiated),
            Err(TrySendError::Full(_)) => Err(PublishError::QueueFull {
                capacity: self.command_sender.max_capacity(),
            }
            .into()),
            Err(TrySendError::Closed(_)) => Err(ChatError::channel_error("session has stopped")),
        }
    }

    /// Current message list, oldest first
    pub fn snapshot(&self) -> Snapshot {
        self.observer.latest()
    }

    /// Change notifications for the message list
    pub fn observe(&self) -> StoreObserver {
        self.observer.clone()
    }

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Whether a transport reports the subscription as live
    pub fn is_connected(&self) -> bool {
        *self.connection.borrow()
    }

    /// Wait until the subscription is live. A publish sent before that may
    /// never be echoed back.
    pub async fn wait_connected(&self) -> ChatResult<()> {
        let mut connection = self.connection.clone();
        connection
            .wait_for(|connected| *connected)
            .await
            .map(|_| ())
            .map_err(|_| ChatError::channel_error("session has stopped"))
    }

    /// Whether the session loop is still accepting commands
    pub fn is_active(&self) -> bool {
        !self.command_sender.is_closed()
    }

    pub(crate) async fn request_shutdown(&self) -> ChatResult<()> {
        self.command_sender
            .send(Command::Shutdown)
            .await
            .map_err(|_| ChatError::channel_error("session has stopped"))
    }
}
