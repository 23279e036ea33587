use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{NewSensorReading, SensorReading};

/// How many readings `GET /api/sensordata` returns at most.
pub const RECENT_READINGS_LIMIT: i64 = 100;

/// Insert-only access to `sensor_readings`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SensorReadingRepository: Send + Sync {
    async fn insert(&self, reading: NewSensorReading) -> Result<SensorReading>;

    /// The most recently timestamped reading, if any.
    async fn latest(&self) -> Result<Option<SensorReading>>;

    /// Up to `limit` readings, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<SensorReading>>;
}

#[derive(Clone)]
pub struct PgSensorReadingRepository {
    pool: PgPool,
}

impl PgSensorReadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SensorReadingRepository for PgSensorReadingRepository {
    async fn insert(&self, reading: NewSensorReading) -> Result<SensorReading> {
        let row = sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensor_readings (humidity, temperature)
            VALUES ($1, $2)
            RETURNING id, humidity, temperature, timestamp
            "#,
        )
        .bind(reading.humidity)
        .bind(reading.temperature)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn latest(&self) -> Result<Option<SensorReading>> {
        let row = sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT id, humidity, temperature, timestamp
            FROM sensor_readings
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<SensorReading>> {
        let rows = sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT id, humidity, temperature, timestamp
            FROM sensor_readings
            ORDER BY timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
