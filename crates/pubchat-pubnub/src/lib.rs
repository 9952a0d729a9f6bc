//! PubNub transport for PubChat
//!
//! This crate provides a `TransportTask` that talks to the PubNub HTTP API:
//! publishes are single `GET /publish` requests and the subscription is a
//! `GET /v2/subscribe` long-poll loop that resumes from the last timetoken.

mod client;
mod config;
mod error;
mod transport;
pub mod wire;

pub use client::PubNubClient;
pub use config::PubNubConfig;
pub use error::PubNubError;
pub use transport::PubNubTransport;
