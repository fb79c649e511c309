use image::{ImageError, ImageFormat, ImageReader, Limits, RgbaImage};
use std::io::Cursor;

use crate::{config::defaults::DEFAULT_MAX_LOGO_DIMENSION, errors::LogoFormatError};

/// Formats accepted for logos: lossless and alpha-capable
const ACCEPTED_FORMATS: &[(&str, ImageFormat)] =
    &[("image/png", ImageFormat::Png), ("image/gif", ImageFormat::Gif)];

/// A decoded logo ready to be composited.
#[derive(Debug, Clone)]
pub struct LogoOverlay {
    pixels: RgbaImage,
    mime_type: &'static str,
}

impl LogoOverlay {
    /// Sniff and decode uploaded logo bytes with the default dimension cap.
    pub fn decode(bytes: &[u8]) -> Result<Self, LogoFormatError> {
        Self::decode_with_limit(bytes, DEFAULT_MAX_LOGO_DIMENSION)
    }

    /// Sniff and decode uploaded logo bytes.
    ///
    /// The format is taken from the magic bytes, never from a filename or a
    /// client-supplied content type. Images wider or taller than
    /// `max_dimension` are rejected from their header, before any pixel data
    /// is allocated.
    pub fn decode_with_limit(bytes: &[u8], max_dimension: u32) -> Result<Self, LogoFormatError> {
        let detected = infer::get(bytes).map(|kind| kind.mime_type());

        let (mime_type, format) = ACCEPTED_FORMATS
            .iter()
            .find(|(mime, _)| Some(*mime) == detected)
            .copied()
            .ok_or_else(|| LogoFormatError::UnsupportedFormat {
                detected: detected.unwrap_or("unknown").to_string(),
            })?;

        let mut limits = Limits::default();
        limits.max_image_width = Some(max_dimension);
        limits.max_image_height = Some(max_dimension);

        let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
        reader.limits(limits);
        let image = reader.decode().map_err(|e| match e {
            ImageError::Limits(_) => LogoFormatError::Decode {
                reason: format!("image is larger than {max_dimension}x{max_dimension} pixels"),
            },
            other => LogoFormatError::Decode {
                reason: other.to_string(),
            },
        })?;

        if image.width() == 0 || image.height() == 0 {
            return Err(LogoFormatError::Decode {
                reason: "image has zero width or height".to_string(),
            });
        }

        Ok(Self {
            pixels: image.into_rgba8(),
            mime_type,
        })
    }

    /// Wrap an already decoded raster.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, LogoFormatError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(LogoFormatError::Decode {
                reason: "image has zero width or height".to_string(),
            });
        }
        Ok(Self {
            pixels,
            mime_type: "image/png",
        })
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Detected source format
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}
