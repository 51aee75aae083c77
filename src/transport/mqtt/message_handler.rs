//! Pure routing of rumqttc events onto the probe callbacks

use rumqttc::{ConnectReturnCode, Event, Packet};

/// Routing decisions for MQTT events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRoute {
    /// CONNACK with its numeric return code
    ConnectionAcknowledged { code: u8 },
    /// PUBLISH received from the broker
    MessageReceived { topic: String, payload: Vec<u8> },
    /// Everything else only shows up in the log
    LogOnly,
}

pub struct MessageHandler;

impl MessageHandler {
    /// Route MQTT event to the matching callback
    pub fn route_mqtt_event(event: &Event) -> EventRoute {
        match event {
            Event::Incoming(Packet::ConnAck(connack)) => EventRoute::ConnectionAcknowledged {
                code: Self::connack_code(&connack.code),
            },
            Event::Incoming(Packet::Publish(publish)) => EventRoute::MessageReceived {
                topic: publish.topic.clone(),
                payload: publish.payload.to_vec(),
            },
            _ => EventRoute::LogOnly,
        }
    }

    /// Log line for an event, in "Received"/"Sending" form
    pub fn describe_event(event: &Event) -> String {
        match event {
            Event::Incoming(packet) => format!("Received {packet:?}"),
            Event::Outgoing(outgoing) => format!("Sending {outgoing:?}"),
        }
    }

    /// MQTT 3.1.1 CONNACK return code as sent on the wire
    pub fn connack_code(code: &ConnectReturnCode) -> u8 {
        match code {
            ConnectReturnCode::Success => 0,
            ConnectReturnCode::RefusedProtocolVersion => 1,
            ConnectReturnCode::BadClientId => 2,
            ConnectReturnCode::ServiceUnavailable => 3,
            ConnectReturnCode::BadUserNamePassword => 4,
            ConnectReturnCode::NotAuthorized => 5,
        }
    }
}

/// Render a payload as a bytes literal, e.g. `b'42 seconds'`
///
/// Printable ASCII is kept as is. Tab, newline and carriage return use their
/// short escapes, and every other byte becomes `\xNN`. The literal is quoted
/// with `"` only when the payload contains `'` but no `"`.
pub fn format_payload(payload: &[u8]) -> String {
    let quote = if payload.contains(&b'\'') && !payload.contains(&b'"') {
        '"'
    } else {
        '\''
    };

    let mut rendered = String::with_capacity(payload.len() + 3);
    rendered.push('b');
    rendered.push(quote);
    for &byte in payload {
        match byte {
            b'\\' => rendered.push_str("\\\\"),
            b'\t' => rendered.push_str("\\t"),
            b'\n' => rendered.push_str("\\n"),
            b'\r' => rendered.push_str("\\r"),
            _ if char::from(byte) == quote => {
                rendered.push('\\');
                rendered.push(quote);
            }
            0x20..=0x7e => rendered.push(char::from(byte)),
            _ => rendered.push_str(&format!("\\x{byte:02x}")),
        }
    }
    rendered.push(quote);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, Outgoing, Publish, QoS};

    #[test]
    fn test_connack_routes_to_connect() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::Success,
            false,
        )));
        assert_eq!(
            MessageHandler::route_mqtt_event(&event),
            EventRoute::ConnectionAcknowledged { code: 0 }
        );
    }

    #[test]
    fn test_refused_connack_keeps_code() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::BadUserNamePassword,
            false,
        )));
        assert_eq!(
            MessageHandler::route_mqtt_event(&event),
            EventRoute::ConnectionAcknowledged { code: 4 }
        );
    }

    #[test]
    fn test_publish_routes_to_message() {
        let publish = Publish::new("$SYS/broker/uptime", QoS::AtMostOnce, "42 seconds");
        let event = Event::Incoming(Packet::Publish(publish));

        assert_eq!(
            MessageHandler::route_mqtt_event(&event),
            EventRoute::MessageReceived {
                topic: "$SYS/broker/uptime".to_string(),
                payload: b"42 seconds".to_vec(),
            }
        );
    }

    #[test]
    fn test_other_packets_are_log_only() {
        let ping = Event::Incoming(Packet::PingResp);
        let outgoing = Event::Outgoing(Outgoing::PingReq);

        assert_eq!(MessageHandler::route_mqtt_event(&ping), EventRoute::LogOnly);
        assert_eq!(
            MessageHandler::route_mqtt_event(&outgoing),
            EventRoute::LogOnly
        );
    }

    #[test]
    fn test_describe_event_direction() {
        assert!(MessageHandler::describe_event(&Event::Incoming(Packet::PingResp))
            .starts_with("Received PingResp"));
        assert!(MessageHandler::describe_event(&Event::Outgoing(Outgoing::PingReq))
            .starts_with("Sending PingReq"));
    }

    #[test]
    fn test_connack_codes_are_distinct() {
        let codes = [
            ConnectReturnCode::Success,
            ConnectReturnCode::RefusedProtocolVersion,
            ConnectReturnCode::BadClientId,
            ConnectReturnCode::ServiceUnavailable,
            ConnectReturnCode::BadUserNamePassword,
            ConnectReturnCode::NotAuthorized,
        ];
        let mapped: Vec<u8> = codes.iter().map(MessageHandler::connack_code).collect();
        assert_eq!(mapped, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_format_payload_escapes_binary() {
        assert_eq!(format_payload(b"1.6.9"), "b'1.6.9'");
        assert_eq!(format_payload(&[0x00, b'a', 0xff]), "b'\\x00a\\xff'");
        assert_eq!(format_payload(b"a\tb\r\n\\"), r"b'a\tb\r\n\\'");
        assert_eq!(format_payload(b""), "b''");
    }

    #[test]
    fn test_format_payload_quoting() {
        assert_eq!(format_payload(br#"say "hi""#), r#"b'say "hi"'"#);
        assert_eq!(format_payload(b"it's"), r#"b"it's""#);
        assert_eq!(format_payload(br#"it's "quoted""#), r#"b'it\'s "quoted"'"#);
    }
}
