//! Text (+ optional logo) to stored PNG artifact.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use ephemeral_artifact_store::{Artifact, ArtifactId, ArtifactStore};
use image::{ImageFormat, RgbImage};
use std::{io::Cursor, sync::Arc};
use tracing::{debug, info};

use crate::{
    barcode::{self, BarcodeSpec},
    compositor::{Compositor, LogoOverlay, LogoPlacement},
    config::{BarcodeConfig, Config},
    errors::{AppError, AppResult},
};

/// Content type of every artifact this pipeline produces
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Outcome of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedQr {
    pub id: ArtifactId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub size_bytes: usize,
    pub logo: Option<LogoPlacement>,
}

/// Rendered PNG plus the logo geometry used to produce it
struct Rendered {
    png: Vec<u8>,
    logo: Option<LogoPlacement>,
}

/// Validates input, renders the QR image and stores it.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct QrPipeline {
    store: ArtifactStore,
    barcode: BarcodeConfig,
    compositor: Compositor,
    max_logo_bytes: usize,
    max_logo_dimension: u32,
}

impl QrPipeline {
    pub fn new(store: ArtifactStore, config: &Config) -> Self {
        Self {
            store,
            barcode: config.barcode.clone(),
            compositor: Compositor::new(config.logo.scale),
            max_logo_bytes: config.logo.max_upload_bytes,
            max_logo_dimension: config.logo.max_dimension,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Generate a QR image for `text` and return its handle.
    pub async fn generate(&self, text: &str, logo: Option<Bytes>) -> AppResult<ArtifactId> {
        self.generate_detailed(text, logo).await.map(|generated| generated.id)
    }

    /// Generate a QR image and report everything the caller may want to show.
    ///
    /// Any failure short-circuits before the store is touched. An empty logo
    /// upload counts as no logo.
    pub async fn generate_detailed(&self, text: &str, logo: Option<Bytes>) -> AppResult<GeneratedQr> {
        let spec = BarcodeSpec::from_config(text, &self.barcode)?;

        let logo = logo.filter(|bytes| !bytes.is_empty());
        if let Some(bytes) = &logo
            && bytes.len() > self.max_logo_bytes
        {
            return Err(AppError::validation(format!(
                "Logo is too large: {} bytes (max: {} bytes)",
                bytes.len(),
                self.max_logo_bytes
            )));
        }

        let compositor = self.compositor;
        let max_logo_dimension = self.max_logo_dimension;
        let render_spec = spec.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            render(&render_spec, logo.as_deref(), compositor, max_logo_dimension)
        })
        .await??;

        let created_at = Utc::now();
        let size_bytes = rendered.png.len();
        let id = self
            .store
            .insert_at(rendered.png, PNG_CONTENT_TYPE, spec.text(), created_at)
            .await;

        info!(
            artifact_id = %id,
            text_chars = spec.text().chars().count(),
            size_bytes,
            with_logo = rendered.logo.is_some(),
            "Generated QR code"
        );

        Ok(GeneratedQr {
            id,
            text: spec.text().to_string(),
            created_at,
            expires_at: self.store.retention_policy().expires_at(created_at),
            size_bytes,
            logo: rendered.logo,
        })
    }

    /// Fetch a stored artifact by its raw handle.
    pub async fn fetch(&self, raw_id: &str) -> AppResult<Arc<Artifact>> {
        let artifact = self.store.lookup_str(raw_id).await?;
        debug!(artifact_id = %artifact.id, "Fetched QR code");
        Ok(artifact)
    }
}

/// CPU-bound part of the pipeline: encode, composite, PNG-encode.
fn render(
    spec: &BarcodeSpec,
    logo: Option<&[u8]>,
    compositor: Compositor,
    max_logo_dimension: u32,
) -> AppResult<Rendered> {
    let base = barcode::encode(spec)?;

    let overlay = logo
        .map(|bytes| LogoOverlay::decode_with_limit(bytes, max_logo_dimension))
        .transpose()?;
    let (flat, placement) = compositor.composite_with_placement(&base, overlay.as_ref());

    Ok(Rendered {
        png: encode_png(&flat)?,
        logo: placement,
    })
}

fn encode_png(image: &RgbImage) -> AppResult<Vec<u8>> {
    let mut png_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| AppError::internal(format!("Failed to encode PNG: {e}")))?;
    Ok(png_bytes)
}
