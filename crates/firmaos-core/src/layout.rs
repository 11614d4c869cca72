//! Stamp layout: bounding box and per-element offsets
//!
//! Two passes over the same inputs: `StampSize::measure` is the size-only
//! pass used to size the on-screen placeholder before any document edit;
//! `StampLayout::compute` is the full pass consumed by the compositor.
//! Both agree exactly on the total bounding box.
//!
//! Text column widths use a fixed monospace approximation
//! (`chars * font_size * 0.6`) rather than real font metrics. That is a
//! documented heuristic inherited from the original stamp format;
//! consulting real metrics would shift every output byte.

use crate::wrap::{wrap_name, WrapLimits};
use serde::{Deserialize, Serialize};

/// Factor applied to the QR raster's natural pixel dimensions.
pub const QR_SCALE: f64 = 0.16;
/// Font size of the attestation header line.
pub const HEADER_FONT_SIZE: f64 = 5.0;
/// Font size of the wrapped signer-name lines.
pub const NAME_FONT_SIZE: f64 = 9.0;
/// Vertical advance between signer-name lines.
pub const LINE_HEIGHT: f64 = 9.0;
/// Horizontal gap between the QR image and the text column.
pub const TEXT_X_GAP: f64 = 5.0;
/// Manual vertical adjustment of the text block.
pub const TEXT_Y_ADJUST: f64 = -5.0;
/// Extra separation between the header baseline and the first name line.
pub const HEADER_NAME_GAP: f64 = 2.0;
/// Minimum estimated width of the text column.
pub const MIN_TEXT_WIDTH: f64 = 80.0;
/// Padding added to the widest estimated text line.
pub const TEXT_PADDING: f64 = 10.0;
/// Monospace glyph width as a fraction of the font size.
pub const GLYPH_WIDTH_FACTOR: f64 = 0.6;
/// Vertical clearance reserved above the text block.
pub const HEADER_CLEARANCE: f64 = 5.0;

/// Header drawn above the signer name on every stamp.
pub const HEADER_TEXT: &str = "Firmado electrónicamente por:";

/// Estimated pixel width of `text` at `font_size` (monospace heuristic).
fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH_FACTOR
}

/// Shared metrics between the size-only and full passes.
struct StampMetrics {
    qr_width: f64,
    qr_height: f64,
    lines: Vec<String>,
    total_text_height: f64,
    total_width: f64,
    total_height: f64,
}

fn metrics(
    qr_natural_w: f64,
    qr_natural_h: f64,
    signer_name: &str,
    limits: WrapLimits,
) -> StampMetrics {
    let qr_width = qr_natural_w * QR_SCALE;
    let qr_height = qr_natural_h * QR_SCALE;

    let lines = wrap_name(signer_name, limits);
    let total_text_height = NAME_FONT_SIZE + lines.len() as f64 * LINE_HEIGHT;

    let widest_line = lines
        .iter()
        .map(|line| estimate_text_width(line, NAME_FONT_SIZE))
        .fold(0.0f64, f64::max);
    let header_width = estimate_text_width(HEADER_TEXT, HEADER_FONT_SIZE);
    let text_width = (header_width.max(widest_line) + TEXT_PADDING).max(MIN_TEXT_WIDTH);

    let total_width = qr_width + TEXT_X_GAP + text_width;
    let total_height = qr_height.max(total_text_height + HEADER_FONT_SIZE + HEADER_CLEARANCE);

    StampMetrics {
        qr_width,
        qr_height,
        lines,
        total_text_height,
        total_width,
        total_height,
    }
}

/// Size-only result: the stamp's footprint without touching any document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampSize {
    pub width: f64,
    pub height: f64,
}

impl StampSize {
    /// Size-only pass. Used to size the on-screen placeholder so its
    /// footprint matches the eventual stamp.
    pub fn measure(
        qr_natural_w: f64,
        qr_natural_h: f64,
        signer_name: &str,
        limits: WrapLimits,
    ) -> Self {
        let m = metrics(qr_natural_w, qr_natural_h, signer_name, limits);
        Self {
            width: m.total_width,
            height: m.total_height,
        }
    }
}

/// Full layout for one marker: everything the compositor needs to draw.
///
/// All Y coordinates are measured from the page bottom, matching the
/// document-mutation collaborator's coordinate convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampLayout {
    pub qr_width: f64,
    pub qr_height: f64,
    /// Bottom-left corner of the QR image.
    pub qr_x: f64,
    pub qr_y: f64,
    /// Left edge shared by the header and all name lines.
    pub text_x: f64,
    /// Header baseline.
    pub header_y: f64,
    /// Wrapped signer-name lines with their baselines, top to bottom.
    pub lines: Vec<String>,
    pub name_line_ys: Vec<f64>,
    pub total_width: f64,
    pub total_height: f64,
}

impl StampLayout {
    /// Full pass for a marker at `(marker_x, marker_y)` — document space,
    /// Y measured from the page top — on a page of height `page_height`.
    pub fn compute(
        qr_natural_w: f64,
        qr_natural_h: f64,
        signer_name: &str,
        limits: WrapLimits,
        marker_x: f64,
        marker_y: f64,
        page_height: f64,
    ) -> Self {
        let m = metrics(qr_natural_w, qr_natural_h, signer_name, limits);

        let qr_y = page_height - marker_y - m.qr_height;
        let qr_center_y = page_height - marker_y - m.qr_height / 2.0;
        let header_y = qr_center_y + m.total_text_height / 2.0 + TEXT_Y_ADJUST;
        let text_x = marker_x + m.qr_width + TEXT_X_GAP;

        let name_line_ys = (0..m.lines.len())
            .map(|i| header_y - NAME_FONT_SIZE - i as f64 * LINE_HEIGHT - HEADER_NAME_GAP)
            .collect();

        Self {
            qr_width: m.qr_width,
            qr_height: m.qr_height,
            qr_x: marker_x,
            qr_y,
            text_x,
            header_y,
            lines: m.lines,
            name_line_ys,
            total_width: m.total_width,
            total_height: m.total_height,
        }
    }

    pub fn size(&self) -> StampSize {
        StampSize {
            width: self.total_width,
            height: self.total_height,
        }
    }
}
