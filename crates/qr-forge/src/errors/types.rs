//! Error type definitions for qr-forge
//!
//! A top-level [`AppError`] plus the component errors it wraps. The display
//! strings of user-correctable errors are shown to end users verbatim.

use ephemeral_artifact_store::StoreError;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected before any work was done
    #[error("{message}")]
    Validation { message: String },

    /// Barcode encoding failed
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Logo upload could not be used
    #[error(transparent)]
    LogoFormat(#[from] LogoFormatError),

    /// Artifact id was never issued (or is malformed)
    #[error("No QR code available")]
    NotFound { id: String },

    /// Artifact existed but outlived its TTL
    #[error("QR code has expired")]
    Expired { id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Barcode encoder errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Text does not fit in the largest symbol at the fixed error-correction level
    #[error("Text is too long to fit in a QR code ({bytes} bytes)")]
    CapacityExceeded { bytes: usize },

    /// Any other encoder failure
    #[error("QR encoding failed: {reason}")]
    Encoder { reason: String },
}

/// Logo upload errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogoFormatError {
    /// Content sniffing found something other than PNG or GIF
    #[error("Unsupported logo format: {detected}. Please upload a PNG or GIF image")]
    UnsupportedFormat { detected: String },

    /// Bytes claimed a supported format but could not be decoded
    #[error("Logo could not be decoded: {reason}")]
    Decode { reason: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller can fix this by changing their input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Encode(EncodeError::CapacityExceeded { .. }) | Self::LogoFormat(_)
        )
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => Self::NotFound { id },
            StoreError::Expired { id } => Self::Expired { id },
            StoreError::Configuration { message } => Self::Configuration { message },
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("Background task failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_lookup_errors() {
        let not_found: AppError = StoreError::NotFound { id: "abc".into() }.into();
        assert!(matches!(not_found, AppError::NotFound { ref id } if id == "abc"));
        assert_eq!(not_found.to_string(), "No QR code available");

        let expired: AppError = StoreError::Expired { id: "abc".into() }.into();
        assert_eq!(expired.to_string(), "QR code has expired");
    }

    #[test]
    fn test_component_errors_display_verbatim() {
        let err: AppError = LogoFormatError::UnsupportedFormat {
            detected: "image/jpeg".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Unsupported logo format: image/jpeg. Please upload a PNG or GIF image"
        );
        assert!(err.is_user_error());

        let err = AppError::validation("Please enter some text");
        assert_eq!(err.to_string(), "Please enter some text");
        assert!(!AppError::internal("boom").is_user_error());
    }
}
