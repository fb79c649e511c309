use image::{GrayImage, Rgb, RgbImage, Rgba, imageops::FilterType};
use serde::Serialize;

use super::logo::LogoOverlay;
use crate::config::defaults::{DEFAULT_LOGO_SCALE, MAX_LOGO_SCALE};

/// Where a logo landed on the base raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogoPlacement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Places logos on the center of barcode rasters.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    scale: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            scale: DEFAULT_LOGO_SCALE,
        }
    }
}

impl Compositor {
    /// `scale` is the logo's longest side as a fraction of the base's shorter
    /// side, clamped to (0, 0.3]. Non-finite or non-positive values fall back
    /// to the default.
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale.min(MAX_LOGO_SCALE)
        } else {
            DEFAULT_LOGO_SCALE
        };
        Self { scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Overlay `logo` (if any) onto `base` and flatten to RGB.
    pub fn composite(&self, base: &GrayImage, logo: Option<&LogoOverlay>) -> RgbImage {
        self.composite_with_placement(base, logo).0
    }

    /// Like [`Compositor::composite`], also reporting where the logo was drawn.
    pub fn composite_with_placement(
        &self,
        base: &GrayImage,
        logo: Option<&LogoOverlay>,
    ) -> (RgbImage, Option<LogoPlacement>) {
        let mut canvas = RgbImage::from_fn(base.width(), base.height(), |x, y| {
            let luma = base.get_pixel(x, y).0[0];
            Rgb([luma, luma, luma])
        });

        let Some(logo) = logo else {
            return (canvas, None);
        };

        let placement = self.placement(base.dimensions(), logo.dimensions());
        let resized = image::imageops::resize(
            logo.pixels(),
            placement.width,
            placement.height,
            FilterType::Lanczos3,
        );

        for (lx, ly, pixel) in resized.enumerate_pixels() {
            canvas.put_pixel(placement.x + lx, placement.y + ly, flatten_on_white(*pixel));
        }

        tracing::debug!(
            logo_width = placement.width,
            logo_height = placement.height,
            x = placement.x,
            y = placement.y,
            "Composited logo"
        );

        (canvas, Some(placement))
    }

    /// Centered, aspect-preserving placement for a logo on a base raster.
    pub fn placement(&self, base: (u32, u32), logo: (u32, u32)) -> LogoPlacement {
        let (base_w, base_h) = base;
        let (width, height) = scaled_dimensions(base_w.min(base_h), logo, self.scale);

        LogoPlacement {
            x: (base_w - width) / 2,
            y: (base_h - height) / 2,
            width,
            height,
        }
    }
}

/// Resize `logo` so its longer side is `floor(shorter_base * scale)`.
fn scaled_dimensions(shorter_base: u32, logo: (u32, u32), scale: f32) -> (u32, u32) {
    let target = ((f64::from(shorter_base) * f64::from(scale)).floor() as u32).clamp(1, shorter_base.max(1));
    let (logo_w, logo_h) = (logo.0.max(1), logo.1.max(1));
    let long = logo_w.max(logo_h);

    let scale_side = |side: u32| -> u32 {
        let scaled = (f64::from(side) * f64::from(target) / f64::from(long)).round() as u32;
        scaled.clamp(1, target)
    };

    if logo_w >= logo_h {
        (target, scale_side(logo_h))
    } else {
        (scale_side(logo_w), target)
    }
}

/// Alpha-blend a pixel onto opaque white.
fn flatten_on_white(pixel: Rgba<u8>) -> Rgb<u8> {
    let [r, g, b, a] = pixel.0;
    let alpha = u32::from(a);
    let blend = |c: u8| -> u8 {
        let value = (u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255;
        value as u8
    };
    Rgb([blend(r), blend(g), blend(b)])
}

/// Composite with the default logo scale.
pub fn composite(base: &GrayImage, logo: Option<&LogoOverlay>) -> RgbImage {
    Compositor::default().composite(base, logo)
}
