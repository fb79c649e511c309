use crate::{
    config::{
        BarcodeConfig,
        defaults::{DEFAULT_MODULE_SIZE, DEFAULT_QUIET_ZONE, MAX_TEXT_CHARS_LIMIT},
    },
    errors::{AppError, AppResult},
};

/// Validated barcode input. Error correction is always level H.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeSpec {
    text: String,
    module_size: u32,
    quiet_zone: u32,
}

impl BarcodeSpec {
    /// Trim and validate `text` against the hard character cap.
    pub fn new(text: &str) -> AppResult<Self> {
        Self::with_limit(text, MAX_TEXT_CHARS_LIMIT)
    }

    /// Trim and validate `text`, allowing at most `max_chars` characters.
    ///
    /// Length is counted in Unicode scalar values, not bytes.
    pub fn with_limit(text: &str, max_chars: usize) -> AppResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Please enter some text to encode."));
        }

        let max_chars = max_chars.min(MAX_TEXT_CHARS_LIMIT);
        if text.chars().count() > max_chars {
            return Err(AppError::validation(format!(
                "Text is too long. Maximum {max_chars} characters allowed."
            )));
        }

        Ok(Self {
            text: text.to_string(),
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
        })
    }

    /// Validate `text` and apply the raster settings from `config`.
    pub fn from_config(text: &str, config: &BarcodeConfig) -> AppResult<Self> {
        Ok(Self::with_limit(text, config.max_text_chars)?
            .module_size(config.module_size)
            .quiet_zone(config.quiet_zone))
    }

    /// Pixels per module side; clamped to at least 1.
    #[must_use]
    pub fn module_size(mut self, module_size: u32) -> Self {
        self.module_size = module_size.max(1);
        self
    }

    /// Light border width in modules.
    #[must_use]
    pub fn quiet_zone(mut self, quiet_zone: u32) -> Self {
        self.quiet_zone = quiet_zone;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn module_px(&self) -> u32 {
        self.module_size
    }

    pub fn quiet_zone_modules(&self) -> u32 {
        self.quiet_zone
    }
}
