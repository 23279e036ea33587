use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use utoipa::OpenApi;

use super::{
    dto::{ControlCommandDto, ControlRequest, ControlResponse, ErrorResponse, SensorReadingDto},
    errors::AppError,
    AppState,
};
use crate::db::{
    models::{ControlMode, ControlSettings},
    RECENT_READINGS_LIMIT,
};

const COMMAND_ACCEPTED: &str = "control command sent and saved";

// ---------------------------------------------------------------------------
// Sensor data
// ---------------------------------------------------------------------------

/// Fetch the most recent sensor reading, or `null` when none exist.
#[utoipa::path(
    get,
    path = "/api/sensordata/latest",
    responses(
        (status = 200, description = "Latest sensor reading or null", body = Option<SensorReadingDto>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "sensors"
)]
pub async fn get_latest_sensor_data(
    State(state): State<AppState>,
) -> Result<Json<Option<SensorReadingDto>>, AppError> {
    let row = state.readings.latest().await?;
    Ok(Json(row.map(Into::into)))
}

/// Fetch up to 100 sensor readings, newest first.
#[utoipa::path(
    get,
    path = "/api/sensordata",
    responses(
        (status = 200, description = "Recent sensor readings, newest first", body = Vec<SensorReadingDto>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "sensors"
)]
pub async fn list_sensor_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let rows = state.readings.recent(RECENT_READINGS_LIMIT).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// Validate a control command, publish it to the device and store it.
#[utoipa::path(
    post,
    path = "/api/controls",
    request_body(
        content = ControlRequest,
        description = "Requested settings; validated by hand",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Command published and stored", body = ControlResponse),
        (status = 400, description = "Invalid control data", body = ErrorResponse),
        (status = 500, description = "Publish or store failure", body = ErrorResponse),
    ),
    tag = "controls"
)]
pub async fn post_control(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ControlResponse>, AppError> {
    let Json(body) = payload?;
    let command = state.dispatcher.dispatch(&body).await?;

    Ok(Json(ControlResponse {
        message: COMMAND_ACCEPTED.to_owned(),
        command: command.into(),
    }))
}

/// Fetch the most recently stored control command, or `null` when none exist.
#[utoipa::path(
    get,
    path = "/api/controls/latest",
    responses(
        (status = 200, description = "Latest stored control command or null", body = Option<ControlCommandDto>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "controls"
)]
pub async fn get_latest_control(
    State(state): State<AppState>,
) -> Result<Json<Option<ControlCommandDto>>, AppError> {
    let row = state.commands.latest().await?;
    Ok(Json(row.map(Into::into)))
}

/// The last command published since this process started.
///
/// In-memory only: starts as `MANUAL` with both outputs off and resets on
/// restart. Use `/api/controls/latest` for the stored history.
#[utoipa::path(
    get,
    path = "/api/controls/current",
    responses(
        (status = 200, description = "Last published command", body = ControlSettings),
    ),
    tag = "controls"
)]
pub async fn get_current_control(State(state): State<AppState>) -> Json<ControlSettings> {
    Json(state.last_command.get().await)
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        get_latest_sensor_data,
        list_sensor_data,
        post_control,
        get_latest_control,
        get_current_control,
        health
    ),
    components(schemas(
        SensorReadingDto,
        ControlCommandDto,
        ControlRequest,
        ControlResponse,
        ControlSettings,
        ControlMode,
        ErrorResponse
    )),
    tags(
        (name = "sensors",  description = "Sensor telemetry endpoints"),
        (name = "controls", description = "Fan/sprinkler control endpoints"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Cooling System Bridge API",
        version = "0.1.0",
        description = "REST API bridging the cooling system's MQTT telemetry and controls"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
