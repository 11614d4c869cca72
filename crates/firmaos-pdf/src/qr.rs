//! QR payload and rasterization for the signature stamp

use crate::error::SignError;
use firmaos_core::AttestationContent;
use image::{codecs::png::PngEncoder, ColorType, ImageBuffer, ImageEncoder, Luma};
use qrcode::{Color, QrCode};

/// A QR code rasterized to PNG, ready for embedding.
///
/// `width`/`height` are the natural pixel dimensions read before the
/// layout engine applies its fixed scale factor.
#[derive(Debug, Clone)]
pub struct QrRaster {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Build the exact attestation payload encoded into the QR code.
pub fn qr_payload(content: &AttestationContent) -> String {
    format!(
        "FIRMADO POR: {}\nRAZON:\nLOCALIZACION:\nFECHA: {}\nFirmado digitalmente con FirmaOS",
        content.signer_name,
        content.timestamp_iso8601(),
    )
}

/// Rasterize `payload` into a PNG QR image.
///
/// The module matrix is upscaled by an integer factor toward ~256 px so
/// module edges stay crisp when the stamp is drawn at reduced size.
pub fn render_qr_png(payload: &str) -> Result<QrRaster, SignError> {
    if payload.is_empty() {
        return Err(SignError::QrAssetMissing);
    }

    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| SignError::ImageRasterization(e.to_string()))?;
    let base_size = code.width() as u32;
    let colors = code.to_colors();

    let mut base = ImageBuffer::<Luma<u8>, Vec<u8>>::new(base_size, base_size);
    for y in 0..base_size {
        for x in 0..base_size {
            let idx = (y * base_size + x) as usize;
            let dark = matches!(colors.get(idx), Some(Color::Dark));
            base.put_pixel(x, y, if dark { Luma([0u8]) } else { Luma([255u8]) });
        }
    }

    let scale = (256 / base_size.max(1)).max(4);
    let scaled_w = base_size * scale;
    let scaled_h = base_size * scale;
    let mut scaled = ImageBuffer::<Luma<u8>, Vec<u8>>::new(scaled_w, scaled_h);
    for y in 0..scaled_h {
        for x in 0..scaled_w {
            scaled.put_pixel(x, y, *base.get_pixel(x / scale, y / scale));
        }
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&scaled, scaled_w, scaled_h, ColorType::L8)
        .map_err(|e| SignError::ImageRasterization(e.to_string()))?;

    Ok(QrRaster {
        png,
        width: scaled_w,
        height: scaled_h,
    })
}
