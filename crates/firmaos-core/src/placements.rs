//! Signature marker store, the single source of truth for positions
//!
//! Positions are always document-space coordinates (scale = 1, Y from the
//! page top); the preview scale never leaks in here. Single-writer by
//! design (§ concurrency model): all mutations arrive sequentially from
//! one logical control thread, so the store carries no locking.

use serde::{Deserialize, Serialize};

/// Default document-space position for a freshly added marker.
pub const DEFAULT_MARKER_X: f64 = 50.0;
pub const DEFAULT_MARKER_Y: f64 = 50.0;

/// Session-unique, monotonically increasing marker identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlacementId(u64);

impl PlacementId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A user-placed anchor where a stamp will be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaturePlacement {
    pub id: PlacementId,
    /// Never changes after creation.
    pub page_index: usize,
    pub x: f64,
    pub y: f64,
}

/// Insertion-ordered collection of signature markers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementStore {
    placements: Vec<SignaturePlacement>,
    next_id: u64,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker on `page_index` at the default position and return its
    /// id. Ids stay unique for the lifetime of the session, even across
    /// removals.
    pub fn add(&mut self, page_index: usize) -> PlacementId {
        let id = PlacementId(self.next_id);
        self.next_id += 1;
        self.placements.push(SignaturePlacement {
            id,
            page_index,
            x: DEFAULT_MARKER_X,
            y: DEFAULT_MARKER_Y,
        });
        id
    }

    /// Remove a marker. An absent id is a no-op, not an error.
    pub fn remove(&mut self, id: PlacementId) {
        self.placements.retain(|p| p.id != id);
    }

    /// Apply a document-space delta to a marker, clamping the result to
    /// non-negative coordinates.
    pub fn update_position(&mut self, id: PlacementId, dx: f64, dy: f64) {
        if let Some(p) = self.placements.iter_mut().find(|p| p.id == id) {
            p.x = (p.x + dx).max(0.0);
            p.y = (p.y + dy).max(0.0);
        }
    }

    pub fn get(&self, id: PlacementId) -> Option<&SignaturePlacement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Markers on one page, in insertion order.
    pub fn for_page(&self, page_index: usize) -> impl Iterator<Item = &SignaturePlacement> {
        self.placements
            .iter()
            .filter(move |p| p.page_index == page_index)
    }

    /// All markers, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SignaturePlacement> {
        self.placements.iter()
    }

    pub fn as_slice(&self) -> &[SignaturePlacement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn clear(&mut self) {
        self.placements.clear();
    }
}
