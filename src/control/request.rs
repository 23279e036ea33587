use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::models::{ControlMode, ControlSettings};

/// Prefix of every validation message returned to HTTP clients.
pub const INVALID_CONTROL_DATA: &str = "invalid control data, expected { modo: \"automatico\" | \"manual\", ventilador: boolean, aspersor: boolean }";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    Malformed(String),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("field {0:?} is missing")]
    Missing(&'static str),
    #[error("field \"modo\" must be a string")]
    ModeNotString,
    #[error("unknown mode {0:?}")]
    UnknownMode(String),
    #[error("field {0:?} must be a boolean")]
    NotBoolean(&'static str),
}

/// Map a request mode token to its normalised form. Case-insensitive.
pub fn parse_mode(token: &str) -> Option<ControlMode> {
    if token.eq_ignore_ascii_case("automatico") {
        Some(ControlMode::Automatic)
    } else if token.eq_ignore_ascii_case("manual") {
        Some(ControlMode::Manual)
    } else {
        None
    }
}

/// Validate a `POST /api/controls` body and normalise it.
///
/// Expects `{ "modo": "automatico" | "manual", "ventilador": bool, "aspersor": bool }`.
/// Booleans must be JSON booleans; `"true"` or `1` are rejected. Unknown extra
/// fields are ignored.
pub fn parse_control_request(body: &Value) -> Result<ControlSettings, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let mode = match obj.get("modo") {
        None | Some(Value::Null) => return Err(ValidationError::Missing("modo")),
        Some(Value::String(s)) => {
            parse_mode(s).ok_or_else(|| ValidationError::UnknownMode(s.clone()))?
        }
        Some(_) => return Err(ValidationError::ModeNotString),
    };

    Ok(ControlSettings {
        mode,
        fan: required_bool(obj, "ventilador")?,
        sprinkler: required_bool(obj, "aspersor")?,
    })
}

fn required_bool(obj: &Map<String, Value>, field: &'static str) -> Result<bool, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ValidationError::NotBoolean(field)),
    }
}
