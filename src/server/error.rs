//! API error type and response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::form::FieldError;
use crate::store::StoreError;
use crate::workflow::{Precondition, WorkflowError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    PayloadTooLarge(String),
    /// Validation failed; carries the inline field messages
    Unprocessable(String, Vec<FieldError>),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unprocessable(..) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => (msg, Vec::new()),
            ApiError::Unprocessable(msg, errors) => (msg, errors),
        };

        if status.is_server_error() {
            tracing::error!("API error: {} - {}", status, message);
        } else {
            tracing::debug!("API error: {} - {}", status, message);
        }

        (
            status,
            Json(ErrorBody {
                error: message,
                errors,
            }),
        )
            .into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Precondition(p @ Precondition::AuthenticationRequired) => {
                ApiError::Unauthorized(p.title().to_string())
            }
            WorkflowError::Precondition(p) => ApiError::BadRequest(p.title().to_string()),
            WorkflowError::NotFound(id) => ApiError::NotFound(format!("card {} not found", id)),
            WorkflowError::Store(StoreError::Duplicate(id)) => {
                ApiError::Internal(format!("duplicate card id {}", id))
            }
            WorkflowError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::InvalidUser(_) => {
                ApiError::Unauthorized(e.to_string())
            }
            AuthError::SessionFile(_) => ApiError::Internal(e.to_string()),
        }
    }
}
