//! Core placement and stamp-layout engine for FirmaOS
//!
//! Everything in this crate is pure computation over document-space
//! coordinates: preview scaling, attestation text wrapping, stamp layout
//! (size-only and full passes) and the signature marker store. PDF
//! mutation lives in the `firmaos-pdf` crate; UI chrome is out of scope.

pub mod drag;
pub mod layout;
pub mod placements;
pub mod scale;
pub mod types;
pub mod wrap;

pub use drag::{commit_drag, to_document_delta};
pub use layout::{StampLayout, StampSize};
pub use placements::{PlacementId, PlacementStore, SignaturePlacement};
pub use scale::fit_scale;
pub use types::{AttestationContent, RenderedPage};
pub use wrap::{wrap_name, WrapLimits};
