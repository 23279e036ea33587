use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::dto::ErrorResponse;
use crate::control::{DispatchError, ValidationError, INVALID_CONTROL_DATA};

#[derive(Debug)]
pub enum AppError {
    /// Client sent something we refuse; the message is returned verbatim.
    BadRequest(String),
    /// The broker did not take the command.
    Publish(anyhow::Error),
    /// Anything else, usually the database. Details stay in the log.
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Publish(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to publish control command".to_owned(),
            ),
            AppError::Internal(e) => {
                error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(format!("{INVALID_CONTROL_DATA}: {e}"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        ValidationError::Malformed(e.body_text()).into()
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Invalid(v) => v.into(),
            DispatchError::Publish(e) => Self::Publish(e),
            persist @ DispatchError::Persist(_) => Self::Internal(persist.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests_with_reason() {
        let err: AppError = ValidationError::NotBoolean("aspersor").into();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.starts_with(INVALID_CONTROL_DATA));
                assert!(msg.contains("aspersor"));
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Publish(anyhow::anyhow!("x")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(anyhow::anyhow!("x")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persist_failure_maps_to_internal_and_keeps_context() {
        let err: AppError = DispatchError::Persist(anyhow::anyhow!("db down")).into();
        match err {
            AppError::Internal(e) => {
                let logged = e.to_string();
                assert!(logged.contains("published but not persisted"));
                assert!(logged.contains("db down"));
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }
}
