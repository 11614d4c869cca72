//! Shared value types crossing the session boundary

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A page rasterized by the external document-rendering collaborator.
///
/// `width`/`height` are the page's natural document-space dimensions
/// (scale = 1). The raster bitmap is opaque to this crate; it is only
/// carried so the preview layer can paint it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    pub raster: Vec<u8>,
}

impl RenderedPage {
    pub fn new(index: usize, width: f64, height: f64, raster: Vec<u8>) -> Self {
        Self {
            index,
            width,
            height,
            raster,
        }
    }
}

/// Attestation content derived once when the user confirms intent to sign.
///
/// Immutable afterwards: the timestamp is fixed here, never regenerated
/// during compositing, so re-running a commit over the same snapshot
/// produces byte-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationContent {
    pub signer_name: String,
    pub signed_at: DateTime<Utc>,
}

impl AttestationContent {
    pub fn new(signer_name: impl Into<String>, signed_at: DateTime<Utc>) -> Self {
        Self {
            signer_name: signer_name.into(),
            signed_at,
        }
    }

    /// Timestamp in ISO-8601 with millisecond precision and `Z` suffix,
    /// the format embedded in the QR payload.
    pub fn timestamp_iso8601(&self) -> String {
        self.signed_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
