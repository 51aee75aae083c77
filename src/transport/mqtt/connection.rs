//! Pure rumqttc option building
//!
//! Maps a [`ConnectionProfile`] onto [`MqttOptions`]: broker address,
//! transport, credentials, keepalive, and the TLS root for encrypted profiles.

use crate::profile::{ConnectionProfile, TransportKind};
use crate::transport::{ClientSettings, TransportError};
use http::header::{HeaderValue, HOST};
use rumqttc::{MqttOptions, TlsConfiguration, Transport};
use std::path::Path;

/// Build a client id unique to this process run
pub fn generate_client_id() -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("testmqtt-{}-{timestamp}", std::process::id())
}

/// Read the CA file and trust it as the only root; no client certificate
pub fn load_tls_configuration(ca_cert_path: &Path) -> Result<TlsConfiguration, TransportError> {
    let ca = std::fs::read(ca_cert_path).map_err(|source| TransportError::CaCertificate {
        path: ca_cert_path.to_path_buf(),
        source,
    })?;

    Ok(TlsConfiguration::Simple {
        ca,
        alpn: None,
        client_auth: None,
    })
}

/// Configure MQTT options for a resolved profile
pub fn configure_mqtt_options(
    client_id: &str,
    profile: &ConnectionProfile,
    settings: &ClientSettings,
) -> Result<MqttOptions, TransportError> {
    // rumqttc takes the full URL as the address for WebSocket transports
    let broker_addr = match profile.transport {
        TransportKind::PlainTcp => profile.host.clone(),
        TransportKind::WebSocket => profile
            .websocket_url()
            .unwrap_or_else(|| format!("ws://{}:{}", profile.host, profile.port)),
    };

    let mut mqtt_options = MqttOptions::new(client_id, broker_addr, profile.port);
    mqtt_options.set_keep_alive(settings.keep_alive);

    if let Some(credentials) = &profile.credentials {
        mqtt_options.set_credentials(
            credentials.username.clone(),
            credentials.password.clone(),
        );
    }

    let tls = profile
        .ca_cert_path
        .as_deref()
        .map(load_tls_configuration)
        .transpose()?;

    let transport = match (profile.transport, tls) {
        (TransportKind::PlainTcp, None) => Transport::Tcp,
        (TransportKind::PlainTcp, Some(tls)) => Transport::Tls(tls),
        (TransportKind::WebSocket, None) => Transport::Ws,
        (TransportKind::WebSocket, Some(tls)) => Transport::Wss(tls),
    };
    mqtt_options.set_transport(transport);

    if profile.transport == TransportKind::WebSocket {
        // HTTP/1.1 requires a Host header on the upgrade request
        let host = HeaderValue::from_str(&profile.host)
            .map_err(|_| TransportError::InvalidHeader(profile.host.clone()))?;
        mqtt_options.set_request_modifier(move |mut request: http::Request<()>| {
            let host = host.clone();
            async move {
                request.headers_mut().insert(HOST, host);
                request
            }
        });
    }

    Ok(mqtt_options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::resolve;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn settings() -> ClientSettings {
        ClientSettings::default()
    }

    #[test]
    fn test_plain_tcp_public_broker() {
        let profile = resolve(false, false, false);
        let options = configure_mqtt_options("probe", &profile, &settings()).unwrap();

        assert_eq!(
            options.broker_address(),
            ("test.mosquitto.org".to_string(), 1883)
        );
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
        assert_eq!(options.credentials(), None);
        assert!(matches!(options.transport(), Transport::Tcp));
    }

    #[test]
    fn test_self_hosted_carries_credentials() {
        let profile = resolve(false, true, false);
        let options = configure_mqtt_options("probe", &profile, &settings()).unwrap();

        assert_eq!(
            options.credentials(),
            Some(("phil".to_string(), "phil".to_string()))
        );
    }

    #[test]
    fn test_websocket_uses_url_address() {
        let profile = resolve(true, true, false);
        let options = configure_mqtt_options("probe", &profile, &settings()).unwrap();

        let (addr, port) = options.broker_address();
        assert_eq!(addr, "ws://local-broker-host:15675/ws");
        assert_eq!(port, 15675);
        assert!(matches!(options.transport(), Transport::Ws));
    }

    #[test]
    fn test_tls_reads_ca_file() {
        let mut ca_file = NamedTempFile::new().unwrap();
        write!(ca_file, "-----BEGIN CERTIFICATE-----").unwrap();

        let mut profile = resolve(false, false, true);
        profile.ca_cert_path = Some(ca_file.path().to_path_buf());

        let options = configure_mqtt_options("probe", &profile, &settings()).unwrap();
        match options.transport() {
            Transport::Tls(TlsConfiguration::Simple {
                ca,
                alpn,
                client_auth,
            }) => {
                assert_eq!(ca, b"-----BEGIN CERTIFICATE-----".to_vec());
                assert!(alpn.is_none());
                assert!(client_auth.is_none());
            }
            _ => panic!("expected simple TLS transport"),
        }
    }

    #[test]
    fn test_wss_with_ca_file() {
        let ca_file = NamedTempFile::new().unwrap();
        let mut profile = resolve(true, true, true);
        profile.ca_cert_path = Some(ca_file.path().to_path_buf());

        let options = configure_mqtt_options("probe", &profile, &settings()).unwrap();
        assert!(matches!(options.transport(), Transport::Wss(_)));
        assert_eq!(options.broker_address().0, "wss://local-broker-host:12345/ws");
    }

    #[test]
    fn test_missing_ca_file_is_reported() {
        let mut profile = resolve(false, true, true);
        profile.ca_cert_path = Some("/nonexistent/testmqtt/cacert.pem".into());

        let result = configure_mqtt_options("probe", &profile, &settings());
        assert!(matches!(
            result,
            Err(TransportError::CaCertificate { .. })
        ));
    }

    #[test]
    fn test_invalid_host_header_rejected() {
        let mut profile = resolve(true, false, false);
        profile.host = "bad\nhost".to_string();

        let result = configure_mqtt_options("probe", &profile, &settings());
        assert!(matches!(result, Err(TransportError::InvalidHeader(_))));
    }

    #[test]
    fn test_keep_alive_from_settings() {
        let profile = resolve(false, false, false);
        let settings = ClientSettings {
            keep_alive: Duration::from_secs(15),
            reconnect_delay: Duration::from_secs(1),
        };
        let options = configure_mqtt_options("probe", &profile, &settings).unwrap();
        assert_eq!(options.keep_alive(), Duration::from_secs(15));
    }

    #[test]
    fn test_client_id_prefix() {
        assert!(generate_client_id().starts_with("testmqtt-"));
    }
}
