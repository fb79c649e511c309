pub mod assets;
pub mod barcode;
pub mod compositor;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod web;
