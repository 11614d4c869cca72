use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignError {
    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("QR raster is not available")]
    QrAssetMissing,

    #[error("Failed to rasterize QR image: {0}")]
    ImageRasterization(String),

    #[error("Page {0} not found in document")]
    PageNotFound(usize),

    #[error("Document operation failed: {0}")]
    Operation(String),

    #[error("Failed to save document: {0}")]
    Save(String),
}
