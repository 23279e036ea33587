pub mod control_commands;
pub mod models;
pub mod sensor_readings;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use control_commands::{ControlCommandRepository, PgControlCommandRepository};
pub use sensor_readings::{PgSensorReadingRepository, SensorReadingRepository, RECENT_READINGS_LIMIT};

pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
