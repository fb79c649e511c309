//! Logo compositing
//!
//! Decodes uploaded logos ([`LogoOverlay`]) and draws them, resized and
//! flattened onto white, at the center of a barcode raster. The output is
//! always an opaque RGB image.

pub mod logo;
pub mod overlay;

pub use logo::LogoOverlay;
pub use overlay::{Compositor, LogoPlacement, composite};
