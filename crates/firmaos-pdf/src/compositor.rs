//! Bake signature markers into permanent stamps
//!
//! The compositor takes the original document bytes, the placement list
//! and the pre-rendered QR raster, and draws one stamp per placement:
//! QR image, header line, then the wrapped signer-name lines. The whole
//! run is all-or-nothing: any failure discards the in-memory document
//! and the caller keeps the untouched original.

use crate::document::{Color, StampDocument, StampFont};
use crate::error::SignError;
use crate::qr::QrRaster;
use firmaos_core::{SignaturePlacement, StampLayout, WrapLimits};
use firmaos_core::layout::{HEADER_FONT_SIZE, HEADER_TEXT, NAME_FONT_SIZE};
use tracing::{debug, info};

/// Draw every placement's stamp into a fresh copy of `pdf_bytes`.
///
/// Assets are embedded once and shared by all stamps. Returns the
/// serialized output document.
pub fn composite(
    pdf_bytes: &[u8],
    placements: &[SignaturePlacement],
    signer_name: &str,
    qr: &QrRaster,
) -> Result<Vec<u8>, SignError> {
    let mut doc = StampDocument::load(pdf_bytes)?;
    info!(
        placements = placements.len(),
        pages = doc.page_count(),
        "compositing stamps"
    );

    let qr_image = doc.embed_image(&qr.png)?;
    let header_font = doc.embed_font(StampFont::Courier);
    let name_font = doc.embed_font(StampFont::CourierBold);

    for placement in placements {
        let (_, page_height) = doc.page_size(placement.page_index)?;
        let layout = StampLayout::compute(
            qr_image.width as f64,
            qr_image.height as f64,
            signer_name,
            WrapLimits::default(),
            placement.x,
            placement.y,
            page_height,
        );
        debug!(
            id = placement.id.value(),
            page = placement.page_index,
            x = placement.x,
            y = placement.y,
            "drawing stamp"
        );

        doc.draw_image(
            placement.page_index,
            &qr_image,
            layout.qr_x,
            layout.qr_y,
            layout.qr_width,
            layout.qr_height,
        )?;
        doc.draw_text(
            placement.page_index,
            HEADER_TEXT,
            layout.text_x,
            layout.header_y,
            HEADER_FONT_SIZE,
            &header_font,
            Color::BLACK,
        )?;
        for (line, y) in layout.lines.iter().zip(&layout.name_line_ys) {
            doc.draw_text(
                placement.page_index,
                line,
                layout.text_x,
                *y,
                NAME_FONT_SIZE,
                &name_font,
                Color::BLACK,
            )?;
        }
    }

    doc.save()
}
