//! Session State
//!
//! Contains the state owned by the session loop and its counters.

use pubchat_core::{
    ChatResult, MessageStore, Publisher, SessionConfig, SubscriptionListener, Timestamp,
};
use tokio::sync::watch;

/// State owned by the session loop
pub struct SessionState {
    pub config: SessionConfig,
    pub listener: SubscriptionListener,
    pub publisher: Publisher,
    pub store: MessageStore,
    /// Whether a transport currently reports the subscription as connected
    pub connection: watch::Sender<bool>,
    pub start_time: Timestamp,
    pub stats: SessionStats,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> ChatResult<Self> {
        config.validate()?;
        let publisher = Publisher::new(config.channel.clone(), config.display_name.clone());
        let (connection, _) = watch::channel(false);

        Ok(Self {
            config,
            listener: SubscriptionListener::new(),
            publisher,
            store: MessageStore::new(),
            connection,
            start_time: Timestamp::now(),
            stats: SessionStats::default(),
        })
    }
}

/// Loop-level counters
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub commands_processed: u64,
    pub events_processed: u64,
    pub effects_sent: u64,
    pub app_events_sent: u64,
    pub app_events_dropped: u64,
}
