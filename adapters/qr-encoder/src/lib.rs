//! qr-encoder — PNG QR code adapter for the `QrEncoder` port.
//!
//! Purpose
//! - Encode a confirmed URL as a QR symbol at the highest error-correction
//!   level (H, roughly 30% of the symbol may be damaged and still decode).
//! - Rasterize onto a fixed 400px square with a one-module quiet zone and
//!   return it as a base64 PNG `EncodedImage`.
//!
//! Notes
//! - Module size is fractional: `width / (modules + 2 * margin)`. Each pixel
//!   samples the module under it, so the image is always exactly `width` wide.
//! - Rendering is CPU-bound and runs on the blocking pool.

use std::io::Cursor;

use async_trait::async_trait;
use domain::{CanonicalUrl, EncodeError, EncodedImage, QrEncoder};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use tracing::trace;

pub const EC_LEVEL: EcLevel = EcLevel::H;
pub const MARGIN_MODULES: u32 = 1;
pub const IMAGE_WIDTH: u32 = 400;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Encoder producing `image/png` payloads.
#[derive(Clone, Copy, Debug)]
pub struct PngQrEncoder {
    width: u32,
    margin: u32,
}

impl PngQrEncoder {
    pub fn new() -> Self {
        Self {
            width: IMAGE_WIDTH,
            margin: MARGIN_MODULES,
        }
    }

    /// Render `data` to PNG bytes synchronously.
    pub fn render_png(&self, data: &str) -> Result<Vec<u8>, EncodeError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EC_LEVEL).map_err(
            |e| match e {
                QrError::DataTooLong => EncodeError::DataTooLong,
                other => EncodeError::Render(other.to_string()),
            },
        )?;
        let raster = rasterize(&code, self.width, self.margin);
        trace!(modules = code.width(), width = self.width, "qr rasterized");

        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(raster)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| EncodeError::Render(e.to_string()))?;
        Ok(buf)
    }
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn rasterize(code: &QrCode, width: u32, margin: u32) -> GrayImage {
    let modules = code.width();
    let colors = code.to_colors();
    let scale = f64::from(width) / (modules as f64 + 2.0 * f64::from(margin));
    let edge = f64::from(margin) * scale;
    let far = f64::from(width) - edge;

    GrayImage::from_fn(width, width, |x, y| {
        let (px, py) = (f64::from(x), f64::from(y));
        if px < edge || py < edge || px >= far || py >= far {
            return LIGHT;
        }
        let col = (((px - edge) / scale).floor() as usize).min(modules - 1);
        let row = (((py - edge) / scale).floor() as usize).min(modules - 1);
        match colors[row * modules + col] {
            Color::Dark => DARK,
            Color::Light => LIGHT,
        }
    })
}

#[async_trait]
impl QrEncoder for PngQrEncoder {
    async fn encode(&self, url: &CanonicalUrl) -> Result<EncodedImage, EncodeError> {
        let encoder = *self;
        let data = url.as_str().to_owned();
        let png = tokio::task::spawn_blocking(move || encoder.render_png(&data))
            .await
            .map_err(|e| EncodeError::Render(e.to_string()))??;
        Ok(EncodedImage::png(&png))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::validate::validate;

    fn decode(png: &[u8]) -> GrayImage {
        image::load_from_memory(png).expect("valid png").to_luma8()
    }

    #[test]
    fn renders_fixed_width_png() {
        let png = PngQrEncoder::new().render_png("https://example.com").unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
        let img = decode(&png);
        assert_eq!(img.dimensions(), (IMAGE_WIDTH, IMAGE_WIDTH));
    }

    #[test]
    fn quiet_zone_is_light_and_finder_corner_is_dark() {
        let data = "https://example.com";
        let code = QrCode::with_error_correction_level(data.as_bytes(), EC_LEVEL).unwrap();
        let scale = f64::from(IMAGE_WIDTH) / (code.width() as f64 + 2.0);

        let img = decode(&PngQrEncoder::new().render_png(data).unwrap());
        assert_eq!(img.get_pixel(0, 0), &LIGHT);
        assert_eq!(img.get_pixel(IMAGE_WIDTH - 1, IMAGE_WIDTH - 1), &LIGHT);

        // Centre of the first symbol module, inside the top-left finder pattern.
        let p = (scale * 1.5) as u32;
        assert_eq!(img.get_pixel(p, p), &DARK);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let data = format!("https://{}.com", "a".repeat(3000));
        let err = PngQrEncoder::new().render_png(&data).unwrap_err();
        assert_eq!(err, EncodeError::DataTooLong);
    }

    #[tokio::test]
    async fn encode_returns_png_data_url() {
        let url = validate("example.com").into_result().unwrap();
        let img = PngQrEncoder::new().encode(&url).await.unwrap();
        assert_eq!(img.mime_type(), "image/png");
        assert!(img.to_data_url().starts_with("data:image/png;base64,iVBOR"));
        let decoded = decode(&img.decode().unwrap());
        assert_eq!(decoded.width(), IMAGE_WIDTH);
    }
}
