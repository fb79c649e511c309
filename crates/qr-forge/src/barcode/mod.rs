//! Text to QR raster encoding
//!
//! [`BarcodeSpec`] holds validated input; [`encode`] turns it into a
//! grayscale raster of pure black and white modules at error-correction
//! level H.

pub mod encoder;
pub mod spec;

pub use encoder::encode;
pub use spec::BarcodeSpec;
