//! Seam between the driver and the MQTT client library
//!
//! The driver never touches the library directly. It asks a [`ClientFactory`]
//! for a [`BrokerClient`] configured from a [`ConnectionProfile`], then hands
//! the client an [`EventHandler`] whose callbacks run on the polling thread.

use crate::config::ProbeConfig;
use crate::profile::ConnectionProfile;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod mqtt;

/// Client-library failures surfaced to the driver
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to read CA certificate {}: {source}", path.display())]
    CaCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid WebSocket Host header '{0}'")]
    InvalidHeader(String),
    #[error("Subscription to '{topic}' could not be queued")]
    Subscribe {
        topic: String,
        #[source]
        source: rumqttc::ClientError,
    },
    #[error("Not connected, subscription to '{topic}' dropped")]
    NotConnected { topic: String },
    #[error("Connection failed: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
}

/// Session settings that do not depend on the flag combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub keep_alive: Duration,
    pub reconnect_delay: Duration,
}

impl ClientSettings {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            keep_alive: config.keep_alive(),
            reconnect_delay: config.reconnect_delay(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}

/// Subscription handle passed to [`EventHandler::on_connect`]
pub trait Subscriber {
    fn subscribe(&mut self, topic_filter: &str) -> Result<(), TransportError>;
}

/// Observer for the three client events
pub trait EventHandler: Send {
    /// CONNACK received (or connection refused) with its return code
    fn on_connect(&mut self, code: u8, subscriber: &mut dyn Subscriber);

    /// PUBLISH received on a subscribed topic
    fn on_message(&mut self, topic: &str, payload: &[u8]);

    /// One line of client-library activity
    fn on_log(&mut self, line: &str);
}

/// A configured client, ready to connect
#[async_trait::async_trait]
pub trait BrokerClient: Send {
    /// Connect and process network traffic, dispatching callbacks.
    ///
    /// Reconnection is owned by the implementation. Production clients never
    /// return `Ok`; test doubles return once their script is exhausted.
    async fn run_forever(
        self: Box<Self>,
        handler: &mut dyn EventHandler,
    ) -> Result<(), TransportError>;
}

/// Builds clients from resolved profiles
pub trait ClientFactory {
    fn create(
        &self,
        profile: &ConnectionProfile,
        settings: &ClientSettings,
    ) -> Result<Box<dyn BrokerClient>, TransportError>;
}
