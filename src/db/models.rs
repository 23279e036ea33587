use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One humidity/temperature sample as stored in `sensor_readings`.
///
/// Rows are insert-only; `id` and `timestamp` are assigned by Postgres.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SensorReading {
    pub id: Uuid,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Degrees Celsius
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSensorReading {
    pub humidity: f64,
    pub temperature: f64,
}

/// Mirrors the `control_mode` Postgres enum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "control_mode", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlMode {
    /// The device regulates fan and sprinkler on its own.
    Automatic,
    /// The device obeys the fan/sprinkler flags it is sent.
    #[default]
    Manual,
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControlMode::Automatic => "AUTOMATIC",
            ControlMode::Manual => "MANUAL",
        };
        f.write_str(s)
    }
}

/// A normalised control command: what gets published to the device, stored,
/// and remembered as the last command.
///
/// Serialises to the device wire format
/// `{"mode":"AUTOMATIC","ventilador":true,"aspersor":false}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ControlSettings {
    pub mode: ControlMode,
    /// Fan output
    #[serde(rename = "ventilador")]
    pub fan: bool,
    /// Sprinkler output
    #[serde(rename = "aspersor")]
    pub sprinkler: bool,
}

/// A control command as stored in `control_commands`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ControlCommand {
    pub id: Uuid,
    pub mode: ControlMode,
    #[sqlx(rename = "ventilador")]
    pub fan: bool,
    #[sqlx(rename = "aspersor")]
    pub sprinkler: bool,
    pub timestamp: DateTime<Utc>,
}

impl ControlCommand {
    pub fn settings(&self) -> ControlSettings {
        ControlSettings {
            mode: self.mode,
            fan: self.fan,
            sprinkler: self.sprinkler,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn control_mode_serialises_uppercase() {
        assert_eq!(serde_json::to_value(ControlMode::Automatic).unwrap(), json!("AUTOMATIC"));
        assert_eq!(serde_json::to_value(ControlMode::Manual).unwrap(), json!("MANUAL"));
        assert_eq!(ControlMode::Automatic.to_string(), "AUTOMATIC");
    }

    #[test]
    fn default_settings_are_manual_and_off() {
        let s = ControlSettings::default();
        assert_eq!(s.mode, ControlMode::Manual);
        assert!(!s.fan);
        assert!(!s.sprinkler);
    }

    #[test]
    fn settings_use_device_field_names() {
        let s = ControlSettings {
            mode: ControlMode::Automatic,
            fan: true,
            sprinkler: false,
        };
        assert_eq!(
            serde_json::to_value(s).unwrap(),
            json!({ "mode": "AUTOMATIC", "ventilador": true, "aspersor": false })
        );
    }

    #[test]
    fn control_command_settings_drop_row_metadata() {
        let cmd = ControlCommand {
            id: Uuid::new_v4(),
            mode: ControlMode::Manual,
            fan: false,
            sprinkler: true,
            timestamp: Utc::now(),
        };
        assert_eq!(
            cmd.settings(),
            ControlSettings {
                mode: ControlMode::Manual,
                fan: false,
                sprinkler: true,
            }
        );
    }
}
