use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::{ControlCommand, ControlMode, SensorReading};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    pub id: Uuid,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Degrees Celsius
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<SensorReading> for SensorReadingDto {
    fn from(r: SensorReading) -> Self {
        Self {
            id: r.id,
            humidity: r.humidity,
            temperature: r.temperature,
            timestamp: r.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ControlCommandDto {
    pub id: Uuid,
    pub mode: ControlMode,
    /// Fan on/off
    pub ventilador: bool,
    /// Sprinkler on/off
    pub aspersor: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<ControlCommand> for ControlCommandDto {
    fn from(c: ControlCommand) -> Self {
        Self {
            id: c.id,
            mode: c.mode,
            ventilador: c.fan,
            aspersor: c.sprinkler,
            timestamp: c.timestamp,
        }
    }
}

/// Request body for `POST /api/controls`.
///
/// Documents the `POST /api/controls` body. Never deserialised: the handler
/// takes raw JSON and validates it field by field, so a wrong type or a
/// missing key is answered with `400` and the precise reason instead of the
/// extractor's generic rejection.
#[derive(Debug, ToSchema)]
pub struct ControlRequest {
    /// `"automatico"` or `"manual"`, any casing.
    #[schema(example = "automatico")]
    pub modo: String,
    pub ventilador: bool,
    pub aspersor: bool,
}

/// Response for `POST /api/controls`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ControlResponse {
    pub message: String,
    pub command: ControlCommandDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
