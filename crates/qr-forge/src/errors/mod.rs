//! Centralized error handling for qr-forge
//!
//! Every layer reports failures through [`AppError`], which the web layer
//! maps onto HTTP status codes.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Empty or oversized text, oversized uploads
//! - **Encode Errors**: Text that does not fit a QR symbol at level H
//! - **Logo Format Errors**: Uploads that are not PNG/GIF or fail to decode
//! - **Lookup Errors**: Unknown or expired artifact ids
//!
//! # Usage
//!
//! ```rust
//! use qr_forge::errors::{AppError, AppResult};
//!
//! fn check(text: &str) -> AppResult<()> {
//!     if text.trim().is_empty() {
//!         return Err(AppError::validation("Please enter some text"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
