//! PDF side of FirmaOS: QR rasterization and stamp compositing
//!
//! This crate implements the document-mutation collaborator over lopdf
//! (load / embed image / embed font / draw image / draw text / save) and
//! the compositor that bakes every signature marker into a permanent
//! stamp. Layout math lives in `firmaos-core`; this crate only executes
//! what the layout engine computed.

pub mod compositor;
pub mod document;
pub mod error;
pub mod qr;

pub use compositor::composite;
pub use document::{Color, FontRef, ImageRef, StampDocument, StampFont};
pub use error::SignError;
pub use qr::{qr_payload, render_qr_png, QrRaster};

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<usize, SignError> {
    Ok(StampDocument::load(bytes)?.page_count())
}

/// Parse PDF bytes and return the natural (document-space) size of every
/// page, in page order.
pub fn page_sizes(bytes: &[u8]) -> Result<Vec<(f64, f64)>, SignError> {
    let doc = StampDocument::load(bytes)?;
    (0..doc.page_count()).map(|i| doc.page_size(i)).collect()
}
