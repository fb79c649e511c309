//! Generation pipeline
//!
//! Ties the barcode encoder, the logo compositor and the artifact store
//! together: text in, artifact handle out.

pub mod orchestrator;

pub use orchestrator::{GeneratedQr, PNG_CONTENT_TYPE, QrPipeline};
