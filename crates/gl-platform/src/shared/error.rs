//! Platform Error Types
//!
//! Every operation is a single best-effort store call: failures are logged
//! at the call site and surfaced to the caller as one generic failure
//! category. No-match conditions are successes, not errors, and never
//! reach this type.

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// The path parameter was not a valid store identifier. Surfaced in the
    /// same generic failure category as store errors.
    #[error("invalid event id: {0}")]
    InvalidId(#[from] bson::oid::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        // The real cause stays server-side; callers get a generic message
        tracing::error!(error = %self, "request failed");

        let body = ErrorBody {
            success: false,
            message: "Server Error".to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            success: false,
            message: "Server Error".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Server Error");
    }

    #[test]
    fn test_malformed_id_maps_to_platform_error() {
        let err = bson::oid::ObjectId::parse_str("not-an-object-id").unwrap_err();
        let err: PlatformError = err.into();
        assert!(matches!(err, PlatformError::InvalidId(_)));
    }
}
