//! ==============================================================================
//! broker.rs - the fetch-one mqtt primitive
//! ==============================================================================
//!
//! purpose:
//!     connect, subscribe to one topic, block until a single publish arrives
//!     on that topic, disconnect. no persistent session, no retry loop.
//!
//! limitation:
//!     there is no receive timeout. a broker that accepts the subscription
//!     but never publishes stalls the caller indefinitely. the ingestion job
//!     is a disposable scheduled task, so this is accepted.
//!
//! relationships:
//!     - used by: ingest.rs (bme topic), dashboard.rs (distance topic, via
//!       spawn_blocking)
//!     - uses: rumqttc (sync Client / Connection)
//!
//! ==============================================================================

use crate::config::MqttConfig;

use rumqttc::{Client, Connection, Event, MqttOptions, Outgoing, Packet, QoS, SubscribeReasonCode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("subscribe to '{topic}' failed: {reason}")]
    Subscribe { topic: String, reason: String },
    #[error("broker connection error: {0}")]
    Connection(String),
    #[error("connection closed before a message arrived")]
    Closed,
}

/// anything that can hand back exactly one raw payload for a topic
pub trait MessageSource: Send + Sync {
    fn fetch_one(&self, topic: &str) -> Result<Vec<u8>, FetchError>;
}

/// mqtt implementation of the fetch-one primitive
#[derive(Debug, Clone)]
pub struct MqttFetcher {
    host: String,
    port: u16,
    keep_alive: Duration,
}

impl MqttFetcher {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            keep_alive: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &MqttConfig) -> Self {
        Self::new(config.broker.clone(), config.port)
            .with_keep_alive(Duration::from_secs(config.keep_alive_seconds))
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        // rumqttc rejects keep-alives below 5s
        self.keep_alive = keep_alive.max(Duration::from_secs(5));
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// a fresh client id per fetch, brokers drop duplicate ids
fn client_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("sensor-dash-{}-{:08x}", std::process::id(), nanos)
}

impl MessageSource for MqttFetcher {
    fn fetch_one(&self, topic: &str) -> Result<Vec<u8>, FetchError> {
        let mut options = MqttOptions::new(client_id(), self.host.clone(), self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);

        let (client, mut connection) = Client::new(options, 10);
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| FetchError::Subscribe {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(host = %self.host, port = self.port, topic, "waiting for one message");

        for notification in connection.iter() {
            match notification {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    disconnect(&client, &mut connection);
                    return Ok(publish.payload.to_vec());
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    if ack.return_codes.iter().any(|c| matches!(c, SubscribeReasonCode::Failure)) {
                        disconnect(&client, &mut connection);
                        return Err(FetchError::Subscribe {
                            topic: topic.to_string(),
                            reason: "broker rejected the subscription".to_string(),
                        });
                    }
                    tracing::debug!(pkid = ack.pkid, "subscription acknowledged");
                }
                Ok(_) => {}
                // the connection is already gone; polling again would reconnect
                Err(e) => return Err(FetchError::Connection(e.to_string())),
            }
        }

        Err(FetchError::Closed)
    }
}

/// send DISCONNECT and drive the event loop until it is on the wire
fn disconnect(client: &Client, connection: &mut Connection) {
    if client.disconnect().is_err() {
        return;
    }
    for notification in connection.iter() {
        match notification {
            Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}
