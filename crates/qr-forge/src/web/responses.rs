//! HTTP response types and utilities
//!
//! Standardized JSON envelopes plus the mapping from [`AppError`] to status
//! codes, so every endpoint reports failures the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use ephemeral_artifact_store::StoreStats;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

/// Payload returned by a successful generate request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: String,
    pub text: String,
    pub image_url: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Health endpoint payload
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub store: StoreStats,
}

/// Status code for an application error
pub fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::LogoFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        AppError::Encode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::NotFound { .. } | AppError::Expired { .. } => StatusCode::NOT_FOUND,
        AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Message safe to show the client for an application error
pub fn public_message(error: &AppError) -> String {
    match error {
        AppError::Configuration { .. } | AppError::Internal { .. } => {
            "Error generating QR code. Please try again.".to_string()
        }
        other => other.to_string(),
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), "Request rejected");
    }

    (status, Json(ApiResponse::<()>::error(public_message(&error)))).into_response()
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EncodeError, LogoFormatError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AppError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&LogoFormatError::UnsupportedFormat { detected: "image/jpeg".into() }.into()),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status_for(&EncodeError::CapacityExceeded { bytes: 4000 }.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&AppError::Expired { id: "a".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AppError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let message = public_message(&AppError::internal("disk on fire at /var/lib"));
        assert!(!message.contains("/var/lib"));
        assert_eq!(
            public_message(&AppError::NotFound { id: "x".into() }),
            "No QR code available"
        );
    }
}
