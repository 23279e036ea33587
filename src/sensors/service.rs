use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::db::{
    models::{NewSensorReading, SensorReading},
    SensorReadingRepository,
};

/// Telemetry as published by the device on the sensor topic.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TelemetryPayload {
    pub umidade: f64,
    pub temperatura: f64,
}

impl From<TelemetryPayload> for NewSensorReading {
    fn from(p: TelemetryPayload) -> Self {
        Self {
            humidity: p.umidade,
            temperature: p.temperatura,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid telemetry payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to persist sensor reading: {0}")]
    Persist(anyhow::Error),
}

/// Turns sensor-topic messages into `sensor_readings` rows.
#[derive(Clone)]
pub struct TelemetryIngest {
    readings: Arc<dyn SensorReadingRepository>,
}

impl TelemetryIngest {
    pub fn new(readings: Arc<dyn SensorReadingRepository>) -> Self {
        Self { readings }
    }

    /// Parse one payload and persist exactly one reading for it.
    pub async fn ingest(&self, payload: &[u8]) -> Result<SensorReading, IngestError> {
        let telemetry: TelemetryPayload = serde_json::from_slice(payload)?;

        let reading = self
            .readings
            .insert(telemetry.into())
            .await
            .map_err(IngestError::Persist)?;

        info!(
            id = %reading.id,
            humidity = reading.humidity,
            temperature = reading.temperature,
            "Sensor reading persisted"
        );
        Ok(reading)
    }

    /// Drain the ingest queue until every sender is dropped.
    /// Failures are logged and the message is dropped; nothing is retried.
    pub async fn run(self, mut queue: mpsc::Receiver<Vec<u8>>) {
        info!("Telemetry ingest worker started");

        while let Some(payload) = queue.recv().await {
            if let Err(e) = self.ingest(&payload).await {
                error!(
                    error = %e,
                    payload = %String::from_utf8_lossy(&payload),
                    "Failed to process sensor message"
                );
            }
        }

        info!("Telemetry ingest worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::db::sensor_readings::MockSensorReadingRepository;

    fn echo_row(r: NewSensorReading) -> SensorReading {
        SensorReading {
            id: Uuid::new_v4(),
            humidity: r.humidity,
            temperature: r.temperature,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn valid_payload_persists_one_reading() {
        let before = Utc::now();
        let mut repo = MockSensorReadingRepository::new();
        repo.expect_insert()
            .withf(|r| r.humidity == 55.2 && r.temperature == 23.1)
            .times(1)
            .returning(|r| Ok(echo_row(r)));

        let ingest = TelemetryIngest::new(Arc::new(repo));
        let reading = ingest
            .ingest(br#"{"umidade":55.2,"temperatura":23.1}"#)
            .await
            .unwrap();

        assert_eq!(reading.humidity, 55.2);
        assert_eq!(reading.temperature, 23.1);
        assert!(reading.timestamp >= before);
    }

    #[tokio::test]
    async fn extra_fields_are_ignored() {
        let mut repo = MockSensorReadingRepository::new();
        repo.expect_insert().times(1).returning(|r| Ok(echo_row(r)));

        let ingest = TelemetryIngest::new(Arc::new(repo));
        let reading = ingest
            .ingest(br#"{"umidade":40,"temperatura":-2.5,"rssi":-70}"#)
            .await
            .unwrap();

        assert_eq!(reading.humidity, 40.0);
        assert_eq!(reading.temperature, -2.5);
    }

    #[tokio::test]
    async fn malformed_payload_is_not_persisted() {
        let mut repo = MockSensorReadingRepository::new();
        repo.expect_insert().times(0);
        let ingest = TelemetryIngest::new(Arc::new(repo));

        let payloads: [&[u8]; 4] = [
            b"not json",
            br#"{"umidade":55.2}"#,
            br#"{"umidade":"55.2","temperatura":23.1}"#,
            br#"55.2"#,
        ];
        for payload in payloads {
            let err = ingest.ingest(payload).await.unwrap_err();
            assert!(matches!(err, IngestError::Parse(_)), "payload {payload:?}");
        }
    }

    #[tokio::test]
    async fn persistence_failure_is_reported() {
        let mut repo = MockSensorReadingRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let ingest = TelemetryIngest::new(Arc::new(repo));
        let err = ingest
            .ingest(br#"{"umidade":1,"temperatura":2}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Persist(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn worker_keeps_going_after_bad_messages() {
        let mut repo = MockSensorReadingRepository::new();
        repo.expect_insert().times(2).returning(|r| Ok(echo_row(r)));

        let (tx, rx) = mpsc::channel(8);
        tx.send(br#"{"umidade":50,"temperatura":20}"#.to_vec()).await.unwrap();
        tx.send(b"garbage".to_vec()).await.unwrap();
        tx.send(br#"{"umidade":51,"temperatura":21}"#.to_vec()).await.unwrap();
        drop(tx);

        TelemetryIngest::new(Arc::new(repo)).run(rx).await;
    }
}
