//! Publisher
//!
//! Wraps user text in an envelope and turns it into a publish effect. Delivery
//! is best effort: completions are logged and nothing is retried. The publisher
//! never touches the message store; a published message shows up only when the
//! network echoes it back through the subscription.

use crate::channel::Effect;
use crate::codec;
use crate::errors::PublishError;
use crate::types::{ChannelName, DeliveryToken, EntryUpdate, PublishId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Counters kept by the publisher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherStats {
    pub published: u64,
    pub delivered: u64,
    pub failed: u64,
    pub ignored_blank: u64,
}

#[derive(Debug)]
pub struct Publisher {
    channel: ChannelName,
    display_name: Option<String>,
    next_id: PublishId,
    pending: HashSet<PublishId>,
    stats: PublisherStats,
}

impl Publisher {
    pub fn new(channel: ChannelName, display_name: Option<String>) -> Self {
        Self {
            channel,
            display_name,
            next_id: PublishId::new(1),
            pending: HashSet::new(),
            stats: PublisherStats::default(),
        }
    }

    /// Prepare a publish for `text`. Blank input yields `None` and no effect.
    pub fn publish(&mut self, text: &str) -> Option<Effect> {
        if text.trim().is_empty() {
            debug!("Ignoring blank publish");
            self.stats.ignored_blank += 1;
            return None;
        }

        let envelope = match &self.display_name {
            Some(name) => EntryUpdate::with_entry(text, name.as_str()),
            None => EntryUpdate::new(text),
        };

        let publish_id = self.next_id;
        self.next_id = publish_id.next();
        self.stats.published += 1;

        let payload = codec::encode(&envelope);
        self.pending.insert(publish_id);
        debug!(publish_id = %publish_id, channel = %self.channel, "Publishing entry update");

        Some(Effect::Publish {
            channel: self.channel.clone(),
            payload,
            publish_id,
        })
    }

    /// Record the outcome of an earlier publish
    pub fn complete(
        &mut self,
        publish_id: PublishId,
        result: &Result<DeliveryToken, PublishError>,
    ) {
        if !self.pending.remove(&publish_id) {
            debug!(publish_id = %publish_id, "Completion for unknown publish");
        }

        match result {
            Ok(token) => {
                self.stats.delivered += 1;
                info!(publish_id = %publish_id, token = %token, "success");
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(publish_id = %publish_id, error = %e, "failed");
            }
        }
    }

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Publishes still awaiting a completion
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> &PublisherStats {
        &self.stats
    }
}
