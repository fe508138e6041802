//! MQTT client for receiving parameter updates
//!
//! Connects to an MQTT broker and subscribes to a topic. Each payload is a
//! JSON object (`{"power": 3, "angle": 45}`) or a text command (`angle 45`);
//! parsed updates are forwarded to the main loop.

use crate::control::parse_update;
use crate::params::ParamUpdate;
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TOPIC: &str = "kaleidoscope";

/// Decode one MQTT payload into a parameter update
pub fn parse_payload(payload: &[u8]) -> Option<ParamUpdate> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    parse_update(text)
}

/// MQTT client that receives updates in a background thread
pub struct MqttClient {
    receiver: Receiver<ParamUpdate>,
    _thread: thread::JoinHandle<()>,
}

impl MqttClient {
    /// Create a new MQTT client and connect to the broker.
    /// Fails immediately if connection cannot be established.
    pub fn new(host: &str, topic: &str) -> Result<Self, String> {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new("kaleidoscope", host, DEFAULT_PORT);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| format!("Failed to subscribe to topic '{}': {}", topic, e))?;

        // Fail fast if the broker is unreachable
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - {}",
                    host, DEFAULT_PORT, e
                ));
            },
            None => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - connection closed",
                    host, DEFAULT_PORT
                ));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::spawn(move || {
            Self::message_loop(connection, sender, &topic_owned);
        });

        tracing::info!(host, port = DEFAULT_PORT, topic, "MQTT connected");

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: rumqttc::Connection, sender: Sender<ParamUpdate>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    match parse_payload(&publish.payload) {
                        Some(update) => {
                            if sender.send(update).is_err() {
                                // Main thread gone
                                break;
                            }
                        },
                        None => tracing::warn!(
                            bytes = publish.payload.len(),
                            "ignoring unparseable MQTT payload"
                        ),
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    // rumqttc reconnects on the next iteration
                    tracing::warn!(error = %e, "MQTT connection error");
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
    }

    /// Poll for pending updates (non-blocking), merged oldest to newest.
    /// Returns `None` if nothing arrived.
    pub fn poll(&self) -> Option<ParamUpdate> {
        let mut merged: Option<ParamUpdate> = None;
        while let Ok(update) = self.receiver.try_recv() {
            merged = Some(match merged {
                Some(earlier) => earlier.merge(update),
                None => update,
            });
        }
        merged
    }

    /// Default MQTT host
    pub fn default_host() -> &'static str {
        DEFAULT_HOST
    }

    /// Default MQTT topic
    pub fn default_topic() -> &'static str {
        DEFAULT_TOPIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_json_payload() {
        let update = parse_payload(br#"{"angle": 45, "polar_center": {"x": 1, "y": 2}}"#).unwrap();
        assert_eq!(update.angle, Some(45.0));
        assert_eq!(update.polar_center, Some(Point::new(1.0, 2.0)));
        assert_eq!(update.power, None);
    }

    #[test]
    fn test_text_payload() {
        let update = parse_payload(b"  rotation 30\n").unwrap();
        assert_eq!(update.polar_rotation, Some(30.0));
    }

    #[test]
    fn test_rejected_payloads() {
        assert_eq!(parse_payload(b""), None);
        assert_eq!(parse_payload(b"   "), None);
        assert_eq!(parse_payload(&[0xff, 0xfe]), None);
        assert_eq!(parse_payload(b"hello world"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(MqttClient::default_topic(), "kaleidoscope");
        assert_eq!(MqttClient::default_host(), "localhost");
    }
}
