//! PubNub transport errors

use pubchat_core::{ChatError, PublishError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PubNubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Publish not accepted: {0}")]
    NotSent(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request URL: {0}")]
    Url(String),
}

impl From<PubNubError> for PublishError {
    fn from(err: PubNubError) -> Self {
        match err {
            PubNubError::Api { status, message } => PublishError::Rejected {
                reason: format!("{status}: {message}"),
            },
            PubNubError::NotSent(reason) => PublishError::Rejected { reason },
            other => PublishError::RequestFailed {
                reason: other.to_string(),
            },
        }
    }
}

impl From<PubNubError> for ChatError {
    fn from(err: PubNubError) -> Self {
        ChatError::connection_failed(err.to_string())
    }
}
