//! rumqttc-backed implementation of the transport seam
//!
//! - [`connection`] - pure option building from a resolved profile
//! - [`message_handler`] - pure event routing onto the callbacks
//! - [`client`] - the client, its factory, and the network loop

pub mod client;
pub mod connection;
pub mod message_handler;

pub use client::{MqttClient, MqttClientFactory};
pub use connection::{configure_mqtt_options, load_tls_configuration};
pub use message_handler::{format_payload, EventRoute, MessageHandler};
