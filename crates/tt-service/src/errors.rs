use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TtError {
    /// Login or token validation failed. The message never reveals which
    /// factor was wrong.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The actor is known but the policy denied the action.
    #[error("Authorization denied")]
    AuthorizationDenied,

    /// The addressed resource does not exist (or is outside the actor's view
    /// where the policy says existence itself is hidden).
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more request fields failed validation. Keys are field names,
    /// sorted, values are human-readable messages.
    #[error("Validation failed")]
    ValidationFailed { fields: BTreeMap<String, String> },

    /// Registration collided with an existing username or email.
    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    /// Unexpected internal failure. Details are logged, never serialized.
    #[error("Internal server error")]
    Internal,
}

impl TtError {
    /// Validation error with a single offending field.
    pub fn validation(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.to_string());
        TtError::ValidationFailed { fields }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
}

impl IntoResponse for TtError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            TtError::AuthenticationFailed(reason) => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                reason,
                None,
            ),
            TtError::AuthorizationDenied => (
                StatusCode::FORBIDDEN,
                "AUTHORIZATION_DENIED",
                "You do not have permission to perform this action".to_string(),
                None,
            ),
            TtError::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", what, None),
            TtError::ValidationFailed { fields } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                "Validation failed".to_string(),
                Some(fields),
            ),
            TtError::DuplicateIdentity(message) => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_IDENTITY",
                message,
                None,
            ),
            TtError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                fields,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
