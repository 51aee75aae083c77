//! Impure I/O: the rumqttc-backed client and its network loop

use super::connection::{configure_mqtt_options, generate_client_id};
use super::message_handler::{EventRoute, MessageHandler};
use crate::profile::ConnectionProfile;
use crate::transport::{
    BrokerClient, ClientFactory, ClientSettings, EventHandler, Subscriber, TransportError,
};
use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectionError, EventLoop, QoS};
use std::time::Duration;
use tracing::{debug, error, info};

/// Request channel capacity between the client handle and the event loop
const REQUEST_CAPACITY: usize = 10;

/// Builds [`MqttClient`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct MqttClientFactory;

impl ClientFactory for MqttClientFactory {
    fn create(
        &self,
        profile: &ConnectionProfile,
        settings: &ClientSettings,
    ) -> Result<Box<dyn BrokerClient>, TransportError> {
        Ok(Box::new(MqttClient::new(profile, settings)?))
    }
}

/// rumqttc client plus the event loop that drives it
pub struct MqttClient {
    client: AsyncClient,
    event_loop: EventLoop,
    reconnect_delay: Duration,
}

impl MqttClient {
    pub fn new(
        profile: &ConnectionProfile,
        settings: &ClientSettings,
    ) -> Result<Self, TransportError> {
        let client_id = generate_client_id();
        let mqtt_options = configure_mqtt_options(&client_id, profile, settings)?;
        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);

        debug!(
            client_id = %client_id,
            transport = %profile.transport,
            tls = profile.use_tls,
            "Created MQTT client"
        );

        Ok(Self {
            client,
            event_loop,
            reconnect_delay: settings.reconnect_delay,
        })
    }

    fn dispatch(client: &AsyncClient, route: EventRoute, handler: &mut dyn EventHandler) {
        match route {
            EventRoute::ConnectionAcknowledged { code: 0 } => {
                info!("Connection acknowledged");
                handler.on_connect(0, &mut QueuedSubscriber { client });
            }
            EventRoute::ConnectionAcknowledged { code } => Self::refused(code, handler),
            EventRoute::MessageReceived { topic, payload } => {
                handler.on_message(&topic, &payload);
            }
            EventRoute::LogOnly => {}
        }
    }

    fn refused(code: u8, handler: &mut dyn EventHandler) {
        info!(code, "Connection refused");
        handler.on_log(&format!("Connection refused with return code {code}"));
        handler.on_connect(code, &mut DisconnectedSubscriber);
    }
}

#[async_trait]
impl BrokerClient for MqttClient {
    async fn run_forever(
        self: Box<Self>,
        handler: &mut dyn EventHandler,
    ) -> Result<(), TransportError> {
        let MqttClient {
            client,
            mut event_loop,
            reconnect_delay,
        } = *self;

        // Every poll after an error reconnects
        loop {
            match event_loop.poll().await {
                Ok(event) => {
                    handler.on_log(&MessageHandler::describe_event(&event));
                    let route = MessageHandler::route_mqtt_event(&event);
                    Self::dispatch(&client, route, handler);
                }
                Err(ConnectionError::ConnectionRefused(code)) => {
                    Self::refused(MessageHandler::connack_code(&code), handler);
                    tokio::time::sleep(reconnect_delay).await;
                }
                // Every client handle is gone, so no request can ever be sent
                Err(e @ ConnectionError::RequestsDone) => return Err(e.into()),
                Err(e) => {
                    error!("MQTT event loop error: {}", e);
                    handler.on_log(&format!("Connection error: {e}"));
                    tokio::time::sleep(reconnect_delay).await;
                }
            }
        }
    }
}

/// Queues SUBSCRIBE requests without blocking the polling thread
struct QueuedSubscriber<'a> {
    client: &'a AsyncClient,
}

impl Subscriber for QueuedSubscriber<'_> {
    fn subscribe(&mut self, topic_filter: &str) -> Result<(), TransportError> {
        self.client
            .try_subscribe(topic_filter, QoS::AtMostOnce)
            .map_err(|source| TransportError::Subscribe {
                topic: topic_filter.to_string(),
                source,
            })
    }
}

/// Handed out after a refused CONNACK, when no session exists to subscribe on
struct DisconnectedSubscriber;

impl Subscriber for DisconnectedSubscriber {
    fn subscribe(&mut self, topic_filter: &str) -> Result<(), TransportError> {
        Err(TransportError::NotConnected {
            topic: topic_filter.to_string(),
        })
    }
}
