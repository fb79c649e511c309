use image::{GrayImage, Luma};
use qrcode::{
    EcLevel, QrCode, Version,
    bits::Bits,
    types::{Color, QrError},
};
use tracing::debug;

use super::spec::BarcodeSpec;
use crate::errors::EncodeError;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Encode `spec` as a QR symbol at level H and rasterize it.
///
/// The smallest version that holds the text is chosen. Each module becomes a
/// `module_size` square of pure black or white, surrounded by a white quiet
/// zone. Identical input always yields an identical raster.
pub fn encode(spec: &BarcodeSpec) -> Result<GrayImage, EncodeError> {
    let text = spec.text();
    let bits = byte_mode_bits(text.as_bytes())?;
    let code = QrCode::with_bits(bits, EcLevel::H).map_err(|error| encoder_error(error, text))?;

    let modules = u32::try_from(code.width()).map_err(|_| EncodeError::Encoder {
        reason: "symbol width out of range".to_string(),
    })?;
    let colors = code.to_colors();

    let module_size = spec.module_px();
    let quiet_zone = spec.quiet_zone_modules();
    let side = quiet_zone
        .checked_mul(2)
        .and_then(|border| border.checked_add(modules))
        .and_then(|total| total.checked_mul(module_size))
        .ok_or_else(|| EncodeError::Encoder {
            reason: "raster dimensions overflow".to_string(),
        })?;

    let raster = GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module_size, y / module_size);
        let inside = |m: u32| m >= quiet_zone && m < quiet_zone + modules;
        if !inside(mx) || !inside(my) {
            return LIGHT;
        }
        let index = ((my - quiet_zone) * modules + (mx - quiet_zone)) as usize;
        match colors.get(index) {
            Some(Color::Dark) => DARK,
            _ => LIGHT,
        }
    });

    debug!(
        text_bytes = text.len(),
        modules,
        side_px = side,
        "Encoded QR symbol"
    );

    Ok(raster)
}

/// Pack `data` as a single byte-mode segment in the smallest level H version.
///
/// The crate's automatic segmentation can pick Kanji mode for UTF-8 byte pairs
/// that happen to be valid Shift-JIS, which readers then decode as Shift-JIS.
fn byte_mode_bits(data: &[u8]) -> Result<Bits, EncodeError> {
    for version in 1..=40 {
        let mut bits = Bits::new(Version::Normal(version));
        match bits
            .push_byte_data(data)
            .and_then(|()| bits.push_terminator(EcLevel::H))
        {
            Ok(()) => return Ok(bits),
            Err(QrError::DataTooLong) => continue,
            Err(other) => {
                return Err(EncodeError::Encoder {
                    reason: other.to_string(),
                });
            }
        }
    }

    Err(EncodeError::CapacityExceeded { bytes: data.len() })
}

fn encoder_error(error: QrError, text: &str) -> EncodeError {
    match error {
        QrError::DataTooLong => EncodeError::CapacityExceeded { bytes: text.len() },
        other => EncodeError::Encoder {
            reason: other.to_string(),
        },
    }
}
