//! testmqtt - MQTT connectivity probe
//!
//! Exercises a self-hosted broker or `test.mosquitto.org` over plain TCP or
//! WebSocket, with or without TLS. Three flags select one of eight connection
//! profiles; the driver configures an rumqttc client for that profile, prints
//! every connect acknowledgment, message and client log line, and keeps the
//! network loop running until the process is stopped.
//!
//! # Quick Start
//!
//! ```rust
//! use testmqtt::profile::{resolve, TransportKind};
//!
//! let profile = resolve(true, false, false);
//! assert_eq!(profile.host, "test.mosquitto.org");
//! assert_eq!(profile.port, 8080);
//! assert_eq!(profile.transport, TransportKind::WebSocket);
//! assert!(profile.credentials.is_none());
//! ```

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod observability;
pub mod profile;
pub mod testing;
pub mod transport;

pub use config::{ConfigError, ProbeConfig};
pub use driver::{ConsoleHandler, Driver, RunOutcome};
pub use error::{ProbeError, ProbeResult};
pub use profile::{
    resolve, resolve_with, BrokerTarget, ConnectionProfile, Credentials, Flags, TransportKind,
};
pub use transport::mqtt::MqttClientFactory;
pub use transport::{BrokerClient, ClientFactory, ClientSettings, EventHandler, TransportError};
