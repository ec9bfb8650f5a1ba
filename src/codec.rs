//! QR code rendering.
//!
//! Symbol construction is delegated to the `qrcode` crate; this module only
//! picks the error-correction level and turns the symbol into PNG bytes.

use std::io::Cursor;

use anyhow::{bail, Context, Result};
use image::{
    imageops::{self, FilterType},
    DynamicImage, ImageFormat, Luma,
};
use qrcode::{EcLevel, QrCode};

/// Edge length in pixels used when nothing else is configured.
pub const DEFAULT_SIZE: u32 = 256;
pub const RECOVERY_LEVEL: EcLevel = EcLevel::M;

#[derive(Debug, Clone)]
pub struct QrGenerator {
    size: u32,
}

impl Default for QrGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl QrGenerator {
    /// A zero size falls back to [`DEFAULT_SIZE`].
    pub fn new(size: u32) -> Self {
        Self {
            size: if size == 0 { DEFAULT_SIZE } else { size },
        }
    }

    pub fn generate(&self, content: &str) -> Result<Vec<u8>> {
        self.generate_with_size(content, self.size)
    }

    /// Render `content` as a `size`×`size` PNG, quiet zone included.
    pub fn generate_with_size(&self, content: &str, size: u32) -> Result<Vec<u8>> {
        if content.is_empty() {
            bail!("content cannot be empty");
        }
        let size = if size == 0 { DEFAULT_SIZE } else { size };

        let code = QrCode::with_error_correction_level(content.as_bytes(), RECOVERY_LEVEL)
            .context("failed to generate qr code")?;
        let mut rendered = code
            .render::<Luma<u8>>()
            .min_dimensions(size, size)
            .build();
        // Whole-pixel modules overshoot; scale back so the edge is exact.
        if rendered.width() != size || rendered.height() != size {
            rendered = imageops::resize(&rendered, size, size, FilterType::Nearest);
        }

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(rendered)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("failed to encode qr code as png")?;

        Ok(png)
    }
}
