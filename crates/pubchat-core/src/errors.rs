//! Error types for PubChat
//!
//! Each concern has its own error enum; `ChatError` unifies them. None of these
//! are fatal to the process: the session loop logs and carries on.

use crate::types::{ChannelName, MessageId};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Failure to turn an inbound payload into an `EntryUpdate`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload is not a key-value object")]
    NotAnObject,
    #[error("Missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("Field `{field}` must be a string")]
    InvalidField { field: &'static str },
    #[error("Field `update` must not be blank")]
    EmptyUpdate,
    #[error("Malformed payload: {reason}")]
    Malformed { reason: String },
}

/// Failure to deliver an outbound envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PublishError {
    #[error("Publish rejected by network: {reason}")]
    Rejected { reason: String },
    #[error("Publish request failed: {reason}")]
    RequestFailed { reason: String },
    #[error("Publish queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },
}

/// Transport-side failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },
    #[error("Invalid transport configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[error("Transport channels not attached: {transport}")]
    ChannelsNotAttached { transport: String },
}

/// Message store invariant violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Message id {id} is already present")]
    DuplicateId { id: MessageId },
}

/// Subscription listener state machine violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    #[error("Listener already bound to channel {channel}")]
    AlreadyBound { channel: ChannelName },
}

// ----------------------------------------------------------------------------
// Unified Error
// ----------------------------------------------------------------------------

/// Core error type for PubChat
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel communication error (internal to the CSP architecture)
    #[error("Channel error: {message}")]
    Channel { message: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl ChatError {
    /// Create a channel error with a message
    pub fn channel_error<T: Into<String>>(message: T) -> Self {
        ChatError::Channel {
            message: message.into(),
        }
    }

    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        ChatError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a transport connection failed error
    pub fn connection_failed<R: Into<String>>(reason: R) -> Self {
        ChatError::Transport(TransportError::ConnectionFailed {
            reason: reason.into(),
        })
    }

    /// Create an invalid transport configuration error
    pub fn invalid_transport_config<R: Into<String>>(reason: R) -> Self {
        ChatError::Transport(TransportError::InvalidConfiguration {
            reason: reason.into(),
        })
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, ChatError>;
pub type ChatResult<T> = Result<T>;
