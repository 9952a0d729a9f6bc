//! PubChat Harness
//!
//! An in-process stand-in for the hosted pub/sub network. Every
//! `LoopbackTransport` created from the same `LoopbackNetwork` sees every
//! publish on the channels it subscribed to, its own included, which mirrors
//! how the hosted network echoes publishes back to the publisher.

mod network;
mod transport;

pub use network::{Delivery, LoopbackNetwork, PublishRecord};
pub use transport::{LoopbackConfig, LoopbackTransport};
