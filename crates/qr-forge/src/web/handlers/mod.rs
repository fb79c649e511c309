//! Web handlers module
//!
//! HTTP request handlers, kept thin: parsing and response shaping here,
//! everything else in the pipeline.

pub mod artifacts;
pub mod generate;
pub mod health;
pub mod index;
