use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{ControlCommand, ControlSettings};

/// Insert-only access to `control_commands`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControlCommandRepository: Send + Sync {
    async fn insert(&self, settings: ControlSettings) -> Result<ControlCommand>;

    /// The most recently timestamped command, if any.
    async fn latest(&self) -> Result<Option<ControlCommand>>;
}

#[derive(Clone)]
pub struct PgControlCommandRepository {
    pool: PgPool,
}

impl PgControlCommandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ControlCommandRepository for PgControlCommandRepository {
    async fn insert(&self, settings: ControlSettings) -> Result<ControlCommand> {
        let row = sqlx::query_as::<_, ControlCommand>(
            r#"
            INSERT INTO control_commands (mode, ventilador, aspersor)
            VALUES ($1, $2, $3)
            RETURNING id, mode, ventilador, aspersor, timestamp
            "#,
        )
        .bind(settings.mode)
        .bind(settings.fan)
        .bind(settings.sprinkler)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn latest(&self) -> Result<Option<ControlCommand>> {
        let row = sqlx::query_as::<_, ControlCommand>(
            r#"
            SELECT id, mode, ventilador, aspersor, timestamp
            FROM control_commands
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
