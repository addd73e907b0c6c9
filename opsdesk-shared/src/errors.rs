use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User/facility errors
/// - E3xxx: Incident errors
/// - E4xxx: Process reference errors
/// - E5xxx: Assistant errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,

    // Auth (E1xxx)
    InvalidCredentials,
    TokenExpired,
    TokenInvalid,
    AccountDisabled,

    // Users / facilities (E2xxx)
    UserNotFound,
    EmailAlreadyExists,
    FacilityNotFound,

    // Incidents (E3xxx)
    IncidentNotFound,
    InvalidStatus,
    InvalidPriority,
    InvalidAssignee,
    AttachmentUploadFailed,
    EmptyComment,

    // Processes (E4xxx)
    ProcessNotFound,

    // Assistant (E5xxx)
    AssistantKeyMissing,
    AssistantUpstreamFailed,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::ServiceUnavailable => "E0006",
            Self::BadRequest => "E0007",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::TokenExpired => "E1002",
            Self::TokenInvalid => "E1003",
            Self::AccountDisabled => "E1004",

            // Users / facilities
            Self::UserNotFound => "E2001",
            Self::EmailAlreadyExists => "E2002",
            Self::FacilityNotFound => "E2003",

            // Incidents
            Self::IncidentNotFound => "E3001",
            Self::InvalidStatus => "E3002",
            Self::InvalidPriority => "E3003",
            Self::InvalidAssignee => "E3004",
            Self::AttachmentUploadFailed => "E3005",
            Self::EmptyComment => "E3006",

            // Processes
            Self::ProcessNotFound => "E4001",

            // Assistant
            Self::AssistantKeyMissing => "E5001",
            Self::AssistantUpstreamFailed => "E5002",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable
            | Self::AssistantKeyMissing | Self::AssistantUpstreamFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ValidationError | Self::BadRequest | Self::InvalidStatus
            | Self::InvalidPriority | Self::InvalidAssignee | Self::EmptyComment
            | Self::AttachmentUploadFailed | Self::FacilityNotFound => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound | Self::IncidentNotFound
            | Self::ProcessNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccountDisabled => StatusCode::FORBIDDEN,
            Self::EmailAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        assert_eq!(ErrorCode::ValidationError.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidPriority.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EmptyComment.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_targets_map_to_not_found() {
        assert_eq!(ErrorCode::IncidentNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ProcessNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UserNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn assistant_failures_are_server_errors() {
        assert_eq!(
            ErrorCode::AssistantKeyMissing.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::AssistantUpstreamFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::InvalidCredentials.code(), "E1001");
        assert_eq!(ErrorCode::IncidentNotFound.code(), "E3001");
        assert_eq!(ErrorCode::EmailAlreadyExists.code(), "E2002");
    }
}
