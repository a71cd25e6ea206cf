use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

pub const DOWNLOAD_FILENAME: &str = "QRCodeSecure.png";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("data does not fit in a QR code: {0}")]
    Symbol(#[from] QrError),

    #[error("could not write PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// A rendered QR code and the URL it points at.
#[derive(Debug, Clone)]
pub struct QrImage {
    pub url: String,
    pub png: Vec<u8>,
}

impl QrImage {
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&self.png)
        )
    }
}

#[derive(Debug, Clone)]
pub struct QrRenderer {
    pub width: u32,
    pub margin: u32,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
    pub ec_level: EcLevel,
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self {
            width: 300,
            margin: 2,
            dark: Rgb([0x0A, 0x4D, 0x68]),
            light: Rgb([0xF0, 0xF8, 0xFF]),
            ec_level: EcLevel::L,
        }
    }
}

impl QrRenderer {
    pub fn render(&self, url: &str) -> Result<QrImage, RenderError> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), self.ec_level)?;
        let modules = code.width();
        let colors = code.to_colors();

        // Modules are scaled fractionally so the image is exactly `width` wide.
        let scale = self.width as f64 / (modules as f64 + 2.0 * self.margin as f64);
        let quiet = self.margin as f64 * scale;

        let module_at = |px: u32| -> Option<usize> {
            let offset = px as f64 - quiet;
            if offset < 0.0 {
                return None;
            }
            let index = (offset / scale).floor() as usize;
            (index < modules).then_some(index)
        };

        let bitmap = RgbImage::from_fn(self.width, self.width, |x, y| {
            match (module_at(x), module_at(y)) {
                (Some(mx), Some(my)) if colors[my * modules + mx] == Color::Dark => self.dark,
                _ => self.light,
            }
        });

        let mut png = Vec::new();
        bitmap.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(QrImage {
            url: url.to_string(),
            png,
        })
    }
}
