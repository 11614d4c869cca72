//! Editor session and application state machine for FirmaOS
//!
//! One `EditorSession` holds everything a signing session needs: the
//! loaded document, the page inventory reported by the external
//! renderer, the marker store, and the attestation fixed at sign
//! intent. All mutations go through the named operations below; there
//! is no other write path, which keeps the single-writer model honest.

pub mod error;

pub use error::SessionError;

use chrono::Utc;
use firmaos_core::{
    commit_drag, fit_scale, AttestationContent, PlacementId, PlacementStore, RenderedPage,
    SignaturePlacement, StampSize, WrapLimits,
};
use firmaos_pdf::{composite, qr_payload, render_qr_png, QrRaster};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The three steps a session moves through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppStep {
    #[default]
    Welcome,
    Editing,
    Completed,
}

/// The document chosen on the welcome screen.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// The artifact handed back after a successful commit.
#[derive(Debug, Clone)]
pub struct SignedOutput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct EditorSession {
    step: AppStep,
    document: Option<LoadedDocument>,
    pages: Vec<RenderedPage>,
    placements: PlacementStore,
    attestation: Option<AttestationContent>,
    qr: Option<QrRaster>,
    signing: bool,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> AppStep {
        self.step
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn placements(&self) -> &PlacementStore {
        &self.placements
    }

    pub fn rendered_pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    pub fn attestation(&self) -> Option<&AttestationContent> {
        self.attestation.as_ref()
    }

    fn require_step(&self, expected: AppStep) -> Result<(), SessionError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(SessionError::WrongStep(self.step))
        }
    }

    fn require_document(&self) -> Result<&LoadedDocument, SessionError> {
        self.document.as_ref().ok_or(SessionError::NoDocument)
    }

    /// Load a document on the welcome screen. The bytes are parsed up
    /// front so a corrupt file is rejected here, with no partial state
    /// left behind.
    pub fn load_document(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<(), SessionError> {
        self.require_step(AppStep::Welcome)?;
        let page_count = firmaos_pdf::page_count(&bytes)?;
        let name = name.into();
        info!(name = %name, page_count, "document loaded");
        self.document = Some(LoadedDocument {
            name,
            bytes,
            page_count,
        });
        self.pages.clear();
        self.placements.clear();
        Ok(())
    }

    /// Record the page inventory produced by the external renderer.
    pub fn set_rendered_pages(&mut self, pages: Vec<RenderedPage>) -> Result<(), SessionError> {
        self.require_document()?;
        self.pages = pages;
        Ok(())
    }

    /// Welcome -> Editing. Requires a loaded document.
    pub fn continue_to_editing(&mut self) -> Result<(), SessionError> {
        self.require_step(AppStep::Welcome)?;
        self.require_document()?;
        self.step = AppStep::Editing;
        Ok(())
    }

    /// Drop a fresh marker on `page_index` at the default position.
    pub fn add_placement(&mut self, page_index: usize) -> Result<PlacementId, SessionError> {
        self.require_step(AppStep::Editing)?;
        let doc = self.require_document()?;
        if page_index >= doc.page_count {
            return Err(SessionError::PageOutOfRange(page_index));
        }
        Ok(self.placements.add(page_index))
    }

    pub fn remove_placement(&mut self, id: PlacementId) -> Result<(), SessionError> {
        self.require_step(AppStep::Editing)?;
        self.placements.remove(id);
        Ok(())
    }

    /// Commit a finished drag gesture. `screen_delta` is in preview
    /// pixels; `scale` is the preview scale the gesture happened at.
    pub fn commit_drag(
        &mut self,
        id: PlacementId,
        screen_delta: (f64, f64),
        scale: f64,
    ) -> Result<(), SessionError> {
        self.require_step(AppStep::Editing)?;
        commit_drag(&mut self.placements, id, screen_delta, scale);
        Ok(())
    }

    /// Fix the attestation content: signer name plus the current time.
    /// The QR raster is rendered here, once; placeholder sizing and the
    /// final commit both reuse it so their footprints agree.
    pub fn prepare_attestation(
        &mut self,
        signer_name: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.require_step(AppStep::Editing)?;
        let content = AttestationContent::new(signer_name, Utc::now());
        let raster = render_qr_png(&qr_payload(&content))?;
        self.attestation = Some(content);
        self.qr = Some(raster);
        Ok(())
    }

    /// Size-only layout pass for the on-screen placeholder, driven by
    /// the same QR raster the commit will embed.
    pub fn placeholder_size(&self) -> Result<StampSize, SessionError> {
        let content = self
            .attestation
            .as_ref()
            .ok_or(SessionError::AttestationMissing)?;
        let qr = self.qr.as_ref().ok_or(SessionError::AttestationMissing)?;
        Ok(StampSize::measure(
            qr.width as f64,
            qr.height as f64,
            &content.signer_name,
            WrapLimits::default(),
        ))
    }

    /// Preview scale for one page given the available viewport.
    pub fn preview_scale(
        &self,
        page_index: usize,
        avail_w: f64,
        avail_h: f64,
    ) -> Option<f64> {
        self.pages
            .iter()
            .find(|p| p.index == page_index)
            .map(|p| fit_scale(avail_w, avail_h, p.width, p.height))
    }

    pub fn placements_for_page(&self, page_index: usize) -> Vec<&SignaturePlacement> {
        self.placements.for_page(page_index).collect()
    }

    /// Bake every marker into a stamp and finish the session.
    ///
    /// Single-flight: a second call while one is outstanding is
    /// rejected. On failure the session stays in Editing with its
    /// placements untouched.
    pub fn sign(&mut self) -> Result<SignedOutput, SessionError> {
        self.require_step(AppStep::Editing)?;
        if self.signing {
            warn!("sign requested while a commit is in flight");
            return Err(SessionError::CommitInFlight);
        }
        let doc = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        let content = self
            .attestation
            .as_ref()
            .ok_or(SessionError::AttestationMissing)?;
        let qr = self.qr.as_ref().ok_or(SessionError::AttestationMissing)?;

        self.signing = true;
        let result = composite(
            &doc.bytes,
            self.placements.as_slice(),
            &content.signer_name,
            qr,
        );
        self.signing = false;

        let bytes = result?;
        let file_name = format!("firmado_{}", doc.name);
        info!(file_name = %file_name, size = bytes.len(), "document signed");
        self.step = AppStep::Completed;
        Ok(SignedOutput { file_name, bytes })
    }

    /// Full reset back to the welcome screen.
    pub fn restart(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object};
    use pretty_assertions::assert_eq;

    fn one_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn editing_session() -> EditorSession {
        let mut session = EditorSession::new();
        session
            .load_document("contrato.pdf", one_page_pdf())
            .unwrap();
        session.continue_to_editing().unwrap();
        session
    }

    #[test]
    fn test_new_session_starts_on_welcome() {
        let session = EditorSession::new();
        assert_eq!(session.step(), AppStep::Welcome);
        assert!(session.document().is_none());
    }

    #[test]
    fn test_load_rejects_corrupt_document() {
        let mut session = EditorSession::new();
        let err = session
            .load_document("broken.pdf", vec![0u8; 32])
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Sign(firmaos_pdf::SignError::DocumentLoad(_))
        ));
        assert!(session.document().is_none());
    }

    #[test]
    fn test_continue_requires_document() {
        let mut session = EditorSession::new();
        assert!(matches!(
            session.continue_to_editing(),
            Err(SessionError::NoDocument)
        ));
    }

    #[test]
    fn test_add_placement_checks_page_range() {
        let mut session = editing_session();
        assert!(session.add_placement(0).is_ok());
        assert!(matches!(
            session.add_placement(3),
            Err(SessionError::PageOutOfRange(3))
        ));
    }

    #[test]
    fn test_placement_ops_rejected_outside_editing() {
        let mut session = EditorSession::new();
        session
            .load_document("contrato.pdf", one_page_pdf())
            .unwrap();
        assert!(matches!(
            session.add_placement(0),
            Err(SessionError::WrongStep(AppStep::Welcome))
        ));
    }

    #[test]
    fn test_commit_drag_moves_marker_in_document_space() {
        let mut session = editing_session();
        let id = session.add_placement(0).unwrap();
        // Half-scale preview: (30, -20) on screen is (60, -40) on paper
        session.commit_drag(id, (30.0, -20.0), 0.5).unwrap();
        let p = session.placements().get(id).unwrap();
        assert_eq!((p.x, p.y), (110.0, 10.0));
    }

    #[test]
    fn test_placeholder_requires_attestation() {
        let session = editing_session();
        assert!(matches!(
            session.placeholder_size(),
            Err(SessionError::AttestationMissing)
        ));
    }

    #[test]
    fn test_placeholder_matches_committed_stamp_footprint() {
        let mut session = editing_session();
        session.prepare_attestation("Juan Pérez").unwrap();
        let size = session.placeholder_size().unwrap();
        assert!(size.width > 0.0 && size.height > 0.0);
        // Same inputs, same pass: stable across calls
        assert_eq!(session.placeholder_size().unwrap(), size);
    }

    #[test]
    fn test_preview_scale_uses_page_inventory() {
        let mut session = editing_session();
        session
            .set_rendered_pages(vec![RenderedPage::new(0, 612.0, 792.0, vec![])])
            .unwrap();
        let scale = session.preview_scale(0, 306.0, 792.0).unwrap();
        assert_eq!(scale, 0.5);
        assert!(session.preview_scale(9, 306.0, 792.0).is_none());
    }

    #[test]
    fn test_full_flow_load_edit_sign() {
        let mut session = editing_session();
        let id = session.add_placement(0).unwrap();
        session.commit_drag(id, (100.0, 200.0), 1.0).unwrap();
        session.prepare_attestation("Maria Fernanda Lopez Gutierrez").unwrap();

        let output = session.sign().unwrap();
        assert_eq!(output.file_name, "firmado_contrato.pdf");
        assert!(output.bytes.starts_with(b"%PDF-"));
        assert_eq!(session.step(), AppStep::Completed);

        // The baked document still parses with the same page count
        assert_eq!(firmaos_pdf::page_count(&output.bytes).unwrap(), 1);
    }

    #[test]
    fn test_sign_requires_attestation() {
        let mut session = editing_session();
        session.add_placement(0).unwrap();
        assert!(matches!(
            session.sign(),
            Err(SessionError::AttestationMissing)
        ));
        assert_eq!(session.step(), AppStep::Editing);
    }

    #[test]
    fn test_sign_rejected_when_commit_in_flight() {
        let mut session = editing_session();
        session.add_placement(0).unwrap();
        session.prepare_attestation("Juan Pérez").unwrap();
        session.signing = true;
        assert!(matches!(session.sign(), Err(SessionError::CommitInFlight)));
        // The guard leaves the session editable once the flight clears
        session.signing = false;
        assert!(session.sign().is_ok());
    }

    #[test]
    fn test_sign_failure_keeps_session_editing() {
        let mut session = editing_session();
        session.prepare_attestation("Juan Pérez").unwrap();
        // Force a placement onto a page the document does not have
        let id = session.placements.add(4);
        let before = session.placements().len();

        assert!(session.sign().is_err());
        assert_eq!(session.step(), AppStep::Editing);
        assert_eq!(session.placements().len(), before);
        assert!(session.placements().get(id).is_some());
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = editing_session();
        session.add_placement(0).unwrap();
        session.prepare_attestation("Juan Pérez").unwrap();
        session.sign().unwrap();

        session.restart();
        assert_eq!(session.step(), AppStep::Welcome);
        assert!(session.document().is_none());
        assert!(session.placements().is_empty());
        assert!(session.attestation().is_none());
    }

    #[test]
    fn test_second_sign_after_completion_is_wrong_step() {
        let mut session = editing_session();
        session.prepare_attestation("Juan Pérez").unwrap();
        session.sign().unwrap();
        assert!(matches!(
            session.sign(),
            Err(SessionError::WrongStep(AppStep::Completed))
        ));
    }
}
