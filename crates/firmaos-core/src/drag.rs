//! Screen-space drag deltas to document-space marker moves

use crate::placements::{PlacementId, PlacementStore};

/// Convert a screen-space drag delta into document space by un-scaling.
///
/// Pure and exact: at a constant scale, converting `d` and then `-d`
/// yields deltas that cancel, so a drag and its reverse restore the
/// original document-space position (up to the store's non-negative
/// clamp).
pub fn to_document_delta(screen_delta: (f64, f64), scale: f64) -> (f64, f64) {
    (screen_delta.0 / scale, screen_delta.1 / scale)
}

/// Commit a finished drag gesture against the store.
///
/// Only the committed end-of-gesture delta is consumed; intermediate
/// move events never touch the store.
pub fn commit_drag(
    store: &mut PlacementStore,
    id: PlacementId,
    screen_delta: (f64, f64),
    scale: f64,
) {
    let (dx, dy) = to_document_delta(screen_delta, scale);
    store.update_position(id, dx, dy);
}
