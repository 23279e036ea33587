use anyhow::{Context, Result};
use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};

use super::CONTROL_TOPIC;
use crate::db::models::ControlSettings;

/// Sends a normalised command to the field device.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn publish(&self, settings: ControlSettings) -> Result<()>;
}

/// Device wire format: `{"mode":"MANUAL","ventilador":false,"aspersor":true}`.
pub fn encode_command(settings: &ControlSettings) -> Result<Vec<u8>> {
    serde_json::to_vec(settings).context("failed to serialise control command")
}

#[derive(Clone)]
pub struct MqttCommandPublisher {
    client: AsyncClient,
}

impl MqttCommandPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandPublisher for MqttCommandPublisher {
    /// Never waits on the client's request channel: while the broker is
    /// unreachable the channel stops draining, and a full channel is an error.
    async fn publish(&self, settings: ControlSettings) -> Result<()> {
        let payload = encode_command(&settings)?;
        self.client
            .try_publish(CONTROL_TOPIC, QoS::AtMostOnce, false, payload)
            .with_context(|| format!("failed to publish to {CONTROL_TOPIC}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rumqttc::MqttOptions;
    use serde_json::{json, Value};

    use super::*;
    use crate::db::models::ControlMode;

    #[test]
    fn encodes_device_wire_format() {
        let bytes = encode_command(&ControlSettings {
            mode: ControlMode::Automatic,
            fan: true,
            sprinkler: false,
        })
        .unwrap();

        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v, json!({ "mode": "AUTOMATIC", "ventilador": true, "aspersor": false }));
    }

    #[tokio::test]
    async fn full_request_channel_is_an_error_not_a_wait() {
        // Event loop is kept alive but never polled, as when the broker is down.
        let options = MqttOptions::new("publisher-test", "127.0.0.1", 1);
        let (client, _eventloop) = AsyncClient::new(options, 2);
        let publisher = MqttCommandPublisher::new(client);
        let settings = ControlSettings::default();

        for _ in 0..2 {
            let sent = tokio::time::timeout(Duration::from_secs(1), publisher.publish(settings))
                .await
                .expect("publish must not block");
            assert!(sent.is_ok());
        }

        let third = tokio::time::timeout(Duration::from_secs(1), publisher.publish(settings))
            .await
            .expect("publish must not block on a full channel");
        let err = third.unwrap_err();
        assert!(err.to_string().contains(CONTROL_TOPIC));
    }

    #[tokio::test]
    async fn closed_request_channel_is_an_error() {
        let options = MqttOptions::new("publisher-test", "127.0.0.1", 1);
        let (client, eventloop) = AsyncClient::new(options, 2);
        drop(eventloop);

        let err = MqttCommandPublisher::new(client)
            .publish(ControlSettings::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains(CONTROL_TOPIC));
    }
}
