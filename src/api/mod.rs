pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{
    command_cache::LastCommandCache,
    control::CommandDispatcher,
    db::{ControlCommandRepository, SensorReadingRepository},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub readings: Arc<dyn SensorReadingRepository>,
    pub commands: Arc<dyn ControlCommandRepository>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub last_command: LastCommandCache,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/sensordata/latest", get(handlers::get_latest_sensor_data))
        .route("/api/sensordata", get(handlers::list_sensor_data))
        .route("/api/controls", post(handlers::post_control))
        .route("/api/controls/latest", get(handlers::get_latest_control))
        .route("/api/controls/current", get(handlers::get_current_control))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
