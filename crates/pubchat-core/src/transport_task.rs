//! Transport Task Trait Definition
//!
//! Defines the common interface for Transport Clients. Concrete
//! implementations live in their own crates (`pubchat-pubnub`,
//! `pubchat-harness`).

use crate::{
    channel::{EffectReceiver, EventSender},
    Result as ChatResult,
};

// ----------------------------------------------------------------------------
// Transport Task Trait
// ----------------------------------------------------------------------------

/// Common interface for transport tasks
///
/// A transport task owns the connection to the pub/sub network. It:
/// - receives `Effect::Subscribe` / `Effect::Publish` from the session loop
/// - sends `Event::MessageReceived`, `Event::Status` and
///   `Event::PublishCompleted` back to it
/// - handles its own reconnection
///
/// The transport only holds channel endpoints to the session. It does not
/// extend the session's lifetime: once the session loop is gone, sends fail
/// and the transport is expected to wind down.
#[async_trait::async_trait]
pub trait TransportTask: Send + Sync {
    /// Attach the channels created by the runtime
    fn attach_channels(
        &mut self,
        event_sender: EventSender,
        effect_receiver: EffectReceiver,
    ) -> ChatResult<()>;

    /// Run the transport's main loop until shutdown or cancellation
    async fn run(&mut self) -> ChatResult<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
