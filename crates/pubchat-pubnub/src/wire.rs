//! PubNub HTTP wire format
//!
//! Request URLs and the JSON bodies of the publish and subscribe responses.
//!
//! Publish: `GET /publish/{pub}/{sub}/0/{channel}/0/{json}` answers
//! `[1, "Sent", "<timetoken>"]`.
//!
//! Subscribe: `GET /v2/subscribe/{sub}/{channels}/0?tt=..&tr=..` answers
//! `{"t": {"t": "<timetoken>", "r": <region>}, "m": [<envelope>, ..]}`.

use crate::config::PubNubConfig;
use crate::error::PubNubError;
use pubchat_core::{ChannelName, ClientId, DeliveryToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

// ----------------------------------------------------------------------------
// Timetokens
// ----------------------------------------------------------------------------

/// Parse a decimal timetoken string
pub fn parse_timetoken(raw: &str) -> Result<DeliveryToken, PubNubError> {
    raw.parse::<u64>()
        .map(DeliveryToken::new)
        .map_err(|_| PubNubError::Parse(format!("invalid timetoken {raw:?}")))
}

/// Position in the channel's message stream. `t == "0"` starts a new subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub t: String,
    #[serde(default)]
    pub r: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            t: "0".to_string(),
            r: 0,
        }
    }
}

impl Cursor {
    pub fn is_initial(&self) -> bool {
        self.t == "0"
    }
}

// ----------------------------------------------------------------------------
// Responses
// ----------------------------------------------------------------------------

/// `[status, description, timetoken]`
#[derive(Debug, Clone, Deserialize)]
pub struct PublishResponse(pub i64, pub String, pub String);

impl PublishResponse {
    pub fn into_result(self) -> Result<DeliveryToken, PubNubError> {
        let PublishResponse(status, description, timetoken) = self;
        if status != 1 {
            return Err(PubNubError::NotSent(description));
        }
        parse_timetoken(&timetoken)
    }
}

/// Parse a publish response body
pub fn parse_publish_response(body: &str) -> Result<DeliveryToken, PubNubError> {
    let response: PublishResponse = serde_json::from_str(body)
        .map_err(|e| PubNubError::Parse(format!("publish response: {e}")))?;
    response.into_result()
}

/// Publish metadata attached to each envelope
#[derive(Debug, Clone, Deserialize)]
pub struct PublishMeta {
    pub t: String,
    #[serde(default)]
    pub r: u32,
}

/// One message delivered by a subscribe poll
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeEnvelope {
    /// Channel the message was published on
    pub c: String,
    /// The published payload
    pub d: Value,
    /// Subscription that matched, when it differs from `c`
    #[serde(default)]
    pub b: Option<String>,
    #[serde(default)]
    pub p: Option<PublishMeta>,
}

impl SubscribeEnvelope {
    pub fn channel(&self) -> ChannelName {
        ChannelName::new(self.c.as_str())
    }

    /// Publish timetoken, if present and well formed
    pub fn token(&self) -> Option<DeliveryToken> {
        self.p.as_ref().and_then(|meta| parse_timetoken(&meta.t).ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeResponse {
    pub t: Cursor,
    #[serde(default)]
    pub m: Vec<SubscribeEnvelope>,
}

/// Parse a subscribe response body
pub fn parse_subscribe_response(body: &str) -> Result<SubscribeResponse, PubNubError> {
    serde_json::from_str(body).map_err(|e| PubNubError::Parse(format!("subscribe response: {e}")))
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    pub status: Option<u16>,
    pub message: Option<String>,
}

/// Best-effort description of an error response
pub fn describe_error(status: u16, body: &str) -> PubNubError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string());
    PubNubError::Api { status, message }
}

// ----------------------------------------------------------------------------
// Request URLs
// ----------------------------------------------------------------------------

fn with_path<'a>(
    origin: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, PubNubError> {
    let mut url = origin.clone();
    url.path_segments_mut()
        .map_err(|_| PubNubError::Url(format!("{origin} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// URL publishing `payload` on `channel`
pub fn publish_url(
    origin: &Url,
    config: &PubNubConfig,
    channel: &ChannelName,
    payload: &Value,
    client_id: &ClientId,
) -> Result<Url, PubNubError> {
    let message = serde_json::to_string(payload)
        .map_err(|e| PubNubError::Parse(format!("payload: {e}")))?;
    let mut url = with_path(
        origin,
        [
            "publish",
            config.publish_key.as_str(),
            config.subscribe_key.as_str(),
            "0",
            channel.as_str(),
            "0",
            message.as_str(),
        ],
    )?;
    url.query_pairs_mut().append_pair("uuid", client_id.as_str());
    Ok(url)
}

/// URL for one subscribe long-poll on `channels`, resuming from `cursor`
pub fn subscribe_url(
    origin: &Url,
    config: &PubNubConfig,
    channels: &[ChannelName],
    cursor: &Cursor,
    client_id: &ClientId,
) -> Result<Url, PubNubError> {
    let channel_list = channels
        .iter()
        .map(ChannelName::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let mut url = with_path(
        origin,
        [
            "v2",
            "subscribe",
            config.subscribe_key.as_str(),
            channel_list.as_str(),
            "0",
        ],
    )?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("uuid", client_id.as_str())
            .append_pair("tt", &cursor.t)
            .append_pair("heartbeat", &config.heartbeat_secs.to_string());
        if !cursor.is_initial() {
            query.append_pair("tr", &cursor.r.to_string());
        }
    }
    Ok(url)
}
