//! Mock client factory for testing
//!
//! [`MockClientFactory`] records every profile it is asked to build and hands
//! out clients that replay a fixed script of events instead of touching the
//! network.

use crate::profile::ConnectionProfile;
use crate::transport::{
    BrokerClient, ClientFactory, ClientSettings, EventHandler, Subscriber, TransportError,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// One event replayed by [`MockBrokerClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedEvent {
    ConnAck(u8),
    Message { topic: String, payload: Vec<u8> },
    Log(String),
}

impl ScriptedEvent {
    pub fn message(topic: &str, payload: &[u8]) -> Self {
        Self::Message {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        }
    }

    pub fn log(line: &str) -> Self {
        Self::Log(line.to_string())
    }
}

/// Mock factory for testing
#[derive(Debug, Clone, Default)]
pub struct MockClientFactory {
    pub created: Arc<Mutex<Vec<(ConnectionProfile, ClientSettings)>>>,
    pub subscriptions: Arc<Mutex<Vec<String>>>,
    pub script: Vec<ScriptedEvent>,
    pub should_fail: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<ScriptedEvent>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn created_profiles(&self) -> Vec<ConnectionProfile> {
        lock(&self.created)
            .iter()
            .map(|(profile, _)| profile.clone())
            .collect()
    }

    pub fn created_settings(&self) -> Vec<ClientSettings> {
        lock(&self.created)
            .iter()
            .map(|(_, settings)| settings.clone())
            .collect()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.subscriptions).clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn create(
        &self,
        profile: &ConnectionProfile,
        settings: &ClientSettings,
    ) -> Result<Box<dyn BrokerClient>, TransportError> {
        if self.should_fail {
            return Err(TransportError::CaCertificate {
                path: "mock-ca.crt".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock CA missing"),
            });
        }

        lock(&self.created).push((profile.clone(), settings.clone()));
        Ok(Box::new(MockBrokerClient {
            script: self.script.clone(),
            subscriptions: self.subscriptions.clone(),
        }))
    }
}

/// Client that replays its script, then returns
pub struct MockBrokerClient {
    script: Vec<ScriptedEvent>,
    subscriptions: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BrokerClient for MockBrokerClient {
    async fn run_forever(
        self: Box<Self>,
        handler: &mut dyn EventHandler,
    ) -> Result<(), TransportError> {
        let MockBrokerClient {
            script,
            subscriptions,
        } = *self;
        let mut subscriber = RecordingSubscriber { subscriptions };

        for event in script {
            match event {
                ScriptedEvent::ConnAck(code) => handler.on_connect(code, &mut subscriber),
                ScriptedEvent::Message { topic, payload } => handler.on_message(&topic, &payload),
                ScriptedEvent::Log(line) => handler.on_log(&line),
            }
        }

        Ok(())
    }
}

struct RecordingSubscriber {
    subscriptions: Arc<Mutex<Vec<String>>>,
}

impl Subscriber for RecordingSubscriber {
    fn subscribe(&mut self, topic_filter: &str) -> Result<(), TransportError> {
        lock(&self.subscriptions).push(topic_filter.to_string());
        Ok(())
    }
}
