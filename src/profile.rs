//! Connection profile resolution
//!
//! Three independent flags (transport, broker target, TLS) select exactly one
//! cell of the broker table. Resolution is pure and total: every combination
//! yields a profile.
//!
//! | broker      | transport | TLS | port  | CA file           | credentials |
//! |-------------|-----------|-----|-------|-------------------|-------------|
//! | public      | TCP       | no  | 1883  |                   |             |
//! | public      | TCP       | yes | 8883  | mosquitto.org.crt |             |
//! | public      | WebSocket | no  | 8080  |                   |             |
//! | public      | WebSocket | yes | 8081  | mosquitto.org.crt |             |
//! | self-hosted | TCP       | no  | 1883  |                   | phil/phil   |
//! | self-hosted | TCP       | yes | 8883  | cacert.pem        | phil/phil   |
//! | self-hosted | WebSocket | no  | 15675 |                   | phil/phil   |
//! | self-hosted | WebSocket | yes | 12345 | cacert.pem        | phil/phil   |

use crate::config::{PortCells, ProbeConfig};
use std::fmt;
use std::path::PathBuf;

/// test.mosquitto.org serves WSS with a certificate that does not chain to
/// the CA it publishes, so the handshake fails against mosquitto.org.crt.
pub const PUBLIC_WSS_CA_MISMATCH: &str =
    "test.mosquitto.org serves encrypted WebSocket with a certificate not signed by mosquitto.org.crt; the TLS handshake is expected to fail";

/// Transport carrying the MQTT session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    PlainTcp,
    WebSocket,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::PlainTcp => write!(f, "tcp"),
            TransportKind::WebSocket => write!(f, "websocket"),
        }
    }
}

/// Which broker the probe talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerTarget {
    PublicTestBroker,
    SelfHosted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The three command-line switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub use_websocket: bool,
    pub use_local_broker: bool,
    pub use_tls: bool,
}

impl Flags {
    pub fn new(use_websocket: bool, use_local_broker: bool, use_tls: bool) -> Self {
        Self {
            use_websocket,
            use_local_broker,
            use_tls,
        }
    }

    /// All eight flag combinations
    pub fn all() -> impl Iterator<Item = Flags> {
        (0u8..8).map(|bits| Flags::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0))
    }
}

/// Everything needed to open one broker connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,
    pub use_tls: bool,
    /// Present iff `use_tls`
    pub ca_cert_path: Option<PathBuf>,
    /// Present iff `target` is [`BrokerTarget::SelfHosted`]
    pub credentials: Option<Credentials>,
    /// Present iff `transport` is [`TransportKind::WebSocket`]
    pub websocket_path: Option<String>,
    pub target: BrokerTarget,
    pub known_issue: Option<&'static str>,
}

impl ConnectionProfile {
    /// CA path as printed in the report line; empty when TLS is off
    pub fn ca_cert_display(&self) -> String {
        self.ca_cert_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Human-readable line printed before connecting
    pub fn report_line(&self) -> String {
        format!(
            "Connecting to {} on port {} with CA cert \"{}\"",
            self.host,
            self.port,
            self.ca_cert_display()
        )
    }

    /// `ws://` or `wss://` URL for WebSocket profiles
    pub fn websocket_url(&self) -> Option<String> {
        let path = self.websocket_path.as_deref()?;
        let scheme = if self.use_tls { "wss" } else { "ws" };
        Some(format!("{scheme}://{}:{}{path}", self.host, self.port))
    }
}

/// Resolve the built-in broker table
pub fn resolve(use_websocket: bool, use_local_broker: bool, use_tls: bool) -> ConnectionProfile {
    resolve_with(
        &ProbeConfig::default(),
        Flags::new(use_websocket, use_local_broker, use_tls),
    )
}

/// Resolve against endpoints loaded from configuration
pub fn resolve_with(config: &ProbeConfig, flags: Flags) -> ConnectionProfile {
    let transport = if flags.use_websocket {
        TransportKind::WebSocket
    } else {
        TransportKind::PlainTcp
    };

    let (target, host, ca_cert, ports, credentials) = if flags.use_local_broker {
        let local = &config.local;
        (
            BrokerTarget::SelfHosted,
            &local.host,
            &local.ca_cert,
            local.ports(),
            Some(Credentials {
                username: local.username.clone(),
                password: local.password.clone(),
            }),
        )
    } else {
        let public = &config.public;
        (
            BrokerTarget::PublicTestBroker,
            &public.host,
            &public.ca_cert,
            public.ports(),
            None,
        )
    };

    let known_issue = match (target, transport, flags.use_tls) {
        (BrokerTarget::PublicTestBroker, TransportKind::WebSocket, true) => {
            Some(PUBLIC_WSS_CA_MISMATCH)
        }
        _ => None,
    };

    ConnectionProfile {
        host: host.clone(),
        port: port_cell(&ports, transport, flags.use_tls),
        transport,
        use_tls: flags.use_tls,
        ca_cert_path: flags.use_tls.then(|| PathBuf::from(ca_cert)),
        credentials,
        websocket_path: (transport == TransportKind::WebSocket)
            .then(|| config.websocket_path.clone()),
        target,
        known_issue,
    }
}

fn port_cell(ports: &PortCells, transport: TransportKind, use_tls: bool) -> u16 {
    match (transport, use_tls) {
        (TransportKind::PlainTcp, false) => ports.tcp,
        (TransportKind::PlainTcp, true) => ports.tls,
        (TransportKind::WebSocket, false) => ports.ws,
        (TransportKind::WebSocket, true) => ports.wss,
    }
}
