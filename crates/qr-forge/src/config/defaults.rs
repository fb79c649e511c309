//! Configuration default values
//!
//! All default values for configuration options live here so they can be
//! changed in one place.
use std::time::Duration;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 5 * 1024 * 1024; // 5MB

// Barcode defaults
pub const DEFAULT_MODULE_SIZE: u32 = 10;
pub const DEFAULT_QUIET_ZONE: u32 = 4;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 1000;
pub const MAX_MODULE_SIZE: u32 = 64;
pub const MAX_QUIET_ZONE: u32 = 16;
/// Hard cap on text length regardless of configuration
pub const MAX_TEXT_CHARS_LIMIT: usize = 1000;

// Logo defaults
pub const DEFAULT_LOGO_SCALE: f32 = 0.2;
pub const MAX_LOGO_SCALE: f32 = 0.3;
pub const DEFAULT_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024; // 2MB
/// Longest accepted logo side in pixels, checked before pixel data is decoded
pub const DEFAULT_MAX_LOGO_DIMENSION: u32 = 4096;
pub const MAX_LOGO_DIMENSION_LIMIT: u32 = 16384;

// Storage defaults
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_REAP_ON_INSERT: bool = true;
