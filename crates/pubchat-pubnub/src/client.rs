//! PubNub REST client
//!
//! Thin wrapper over `reqwest` issuing the publish and subscribe requests.

use crate::config::PubNubConfig;
use crate::error::PubNubError;
use crate::wire::{self, Cursor, SubscribeResponse};
use pubchat_core::{ChannelName, ChatResult, ClientId, DeliveryToken};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// HTTP client bound to one set of keys and one client id
#[derive(Clone)]
pub struct PubNubClient {
    http: Client,
    origin: Url,
    config: PubNubConfig,
    client_id: ClientId,
}

impl PubNubClient {
    pub fn new(config: PubNubConfig, client_id: ClientId) -> ChatResult<Self> {
        config.validate()?;
        let origin = config.origin_url()?;
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(PubNubError::from)?;

        Ok(Self {
            http,
            origin,
            config,
            client_id,
        })
    }

    pub fn config(&self) -> &PubNubConfig {
        &self.config
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Publish one payload and return the timetoken the network assigned
    pub async fn publish(
        &self,
        channel: &ChannelName,
        payload: &Value,
    ) -> Result<DeliveryToken, PubNubError> {
        let url = wire::publish_url(&self.origin, &self.config, channel, payload, &self.client_id)?;
        let body = self.get(url).await?;
        wire::parse_publish_response(&body)
    }

    /// One long-poll. Returns when messages arrive or the server times the poll out.
    pub async fn subscribe(
        &self,
        channels: &[ChannelName],
        cursor: &Cursor,
    ) -> Result<SubscribeResponse, PubNubError> {
        let url =
            wire::subscribe_url(&self.origin, &self.config, channels, cursor, &self.client_id)?;
        let body = self.get(url).await?;
        wire::parse_subscribe_response(&body)
    }

    async fn get(&self, url: Url) -> Result<String, PubNubError> {
        debug!(path = url.path(), "PubNub request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(wire::describe_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}
