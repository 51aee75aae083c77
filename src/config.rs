//! Probe configuration
//!
//! Every value has a default that reproduces the built-in broker table, so the
//! probe runs without any file. A TOML file passed with `--config` overrides
//! individual keys.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const PUBLIC_BROKER_HOST: &str = "test.mosquitto.org";
pub const PUBLIC_BROKER_CA_CERT: &str = "mosquitto.org.crt";
pub const LOCAL_BROKER_HOST: &str = "local-broker-host";
pub const LOCAL_BROKER_CA_CERT: &str = "cacert.pem";
pub const LOCAL_BROKER_USERNAME: &str = "phil";
pub const LOCAL_BROKER_PASSWORD: &str = "phil";
pub const DEFAULT_STATUS_TOPIC: &str = "$SYS/#";
pub const DEFAULT_WEBSOCKET_PATH: &str = "/ws";

/// Top-level probe configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// MQTT keepalive interval in seconds
    pub keep_alive_secs: u64,
    /// Pause between failed polls while the client library reconnects
    pub reconnect_delay_secs: u64,
    /// Topic filter subscribed to after every CONNACK
    pub status_topic: String,
    /// HTTP path used for MQTT over WebSocket
    pub websocket_path: String,
    /// Public test broker endpoints
    pub public: PublicBrokerSection,
    /// Self-hosted broker endpoints and credentials
    pub local: LocalBrokerSection,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: 60,
            reconnect_delay_secs: 1,
            status_topic: DEFAULT_STATUS_TOPIC.to_string(),
            websocket_path: DEFAULT_WEBSOCKET_PATH.to_string(),
            public: PublicBrokerSection::default(),
            local: LocalBrokerSection::default(),
        }
    }
}

/// One port per (transport, TLS) cell of a broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCells {
    pub tcp: u16,
    pub tls: u16,
    pub ws: u16,
    pub wss: u16,
}

impl PortCells {
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        for (name, port) in [
            ("tcp_port", self.tcp),
            ("tls_port", self.tls),
            ("ws_port", self.ws),
            ("wss_port", self.wss),
        ] {
            if port == 0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "[{section}] {name} must be between 1 and 65535"
                )));
            }
        }
        Ok(())
    }
}

/// `[public]` section - the anonymous test broker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PublicBrokerSection {
    pub host: String,
    /// CA certificate file, resolved against the working directory
    pub ca_cert: String,
    pub tcp_port: u16,
    pub tls_port: u16,
    pub ws_port: u16,
    pub wss_port: u16,
}

impl Default for PublicBrokerSection {
    fn default() -> Self {
        Self {
            host: PUBLIC_BROKER_HOST.to_string(),
            ca_cert: PUBLIC_BROKER_CA_CERT.to_string(),
            tcp_port: 1883,
            tls_port: 8883,
            ws_port: 8080,
            wss_port: 8081,
        }
    }
}

impl PublicBrokerSection {
    pub fn ports(&self) -> PortCells {
        PortCells {
            tcp: self.tcp_port,
            tls: self.tls_port,
            ws: self.ws_port,
            wss: self.wss_port,
        }
    }
}

/// `[local]` section - the self-hosted broker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocalBrokerSection {
    pub host: String,
    /// CA certificate file, resolved against the working directory
    pub ca_cert: String,
    pub username: String,
    pub password: String,
    pub tcp_port: u16,
    pub tls_port: u16,
    pub ws_port: u16,
    pub wss_port: u16,
}

impl Default for LocalBrokerSection {
    fn default() -> Self {
        Self {
            host: LOCAL_BROKER_HOST.to_string(),
            ca_cert: LOCAL_BROKER_CA_CERT.to_string(),
            username: LOCAL_BROKER_USERNAME.to_string(),
            password: LOCAL_BROKER_PASSWORD.to_string(),
            tcp_port: 1883,
            tls_port: 8883,
            ws_port: 15675,
            wss_port: 12345,
        }
    }
}

impl LocalBrokerSection {
    pub fn ports(&self) -> PortCells {
        PortCells {
            tcp: self.tcp_port,
            tls: self.tls_port,
            ws: self.ws_port,
            wss: self.wss_port,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProbeConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ProbeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keep_alive_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "keep_alive_secs must be at least 1".to_string(),
            ));
        }
        if self.reconnect_delay_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "reconnect_delay_secs must be at least 1".to_string(),
            ));
        }
        if self.status_topic.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "status_topic must not be empty".to_string(),
            ));
        }
        if !self.websocket_path.starts_with('/') {
            return Err(ConfigError::InvalidConfig(format!(
                "websocket_path '{}' must start with '/'",
                self.websocket_path
            )));
        }

        validate_endpoint("public", &self.public.host, &self.public.ca_cert)?;
        self.public.ports().validate("public")?;

        validate_endpoint("local", &self.local.host, &self.local.ca_cert)?;
        self.local.ports().validate("local")?;

        Ok(())
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

fn validate_endpoint(section: &str, host: &str, ca_cert: &str) -> Result<(), ConfigError> {
    if host.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(format!(
            "[{section}] host must not be empty"
        )));
    }
    if ca_cert.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(format!(
            "[{section}] ca_cert must not be empty"
        )));
    }
    Ok(())
}
