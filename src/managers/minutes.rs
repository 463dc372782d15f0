use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/* ──────────────────────────────────────────────────────────────── */

/// Publication status of an acta.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActaStatus {
    Draft,
    Published,
}

/// A meeting minutes document.
///
/// `signature`, `signed_by` and `signed_at` travel together: all three are
/// set exactly when `status` is `Published`, and never individually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Acta {
    /// Unique identifier, assigned when the draft is created.
    pub id: String,
    pub title: String,
    /// Calendar date of the session, ISO "YYYY-MM-DD".
    pub date: String,
    pub executive_summary: String,
    /// Agreements reached, in the order they were adopted.
    pub agreements: Vec<String>,
    /// Full transcript; editable while the acta is a draft.
    pub transcript: String,
    pub created_by: String,
    pub status: ActaStatus,
    /// Signature image as a base64 PNG data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
    /// RFC 3339 timestamp of the signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
}

impl Acta {
    /// A fresh unsigned draft dated today.
    pub fn draft(
        title: impl Into<String>,
        executive_summary: impl Into<String>,
        agreements: Vec<String>,
        transcript: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
            executive_summary: executive_summary.into(),
            agreements,
            transcript: transcript.into(),
            created_by: created_by.into(),
            status: ActaStatus::Draft,
            signature: None,
            signed_by: None,
            signed_at: None,
        }
    }

    /// Pure signing transform: a published copy with the signature triple
    /// set. The receiver is left untouched; detail views may still hold it.
    pub fn signed(&self, signature: &str, signed_by: &str) -> Acta {
        let mut signed = self.clone();
        signed.status = ActaStatus::Published;
        signed.signature = Some(signature.to_string());
        signed.signed_by = Some(signed_by.to_string());
        signed.signed_at = Some(Utc::now().to_rfc3339());
        signed
    }

    pub fn is_published(&self) -> bool {
        self.status == ActaStatus::Published
    }
}

/* ──────────────────────────────────────────────────────────────── */

/// Where the review/signature pipeline currently is.
///
/// `ClosingEditor` exists because the transcript editor and the signature
/// canvas are both WebView-backed on Android and fight over touch input when
/// alive at the same time. The signature surface may only mount after the
/// caller reports the editor fully unmounted (`editor_closed`); there is no
/// timer-based shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFlow {
    Idle,
    Editing,
    ClosingEditor,
    Signing,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no pending draft")]
    NoPendingDraft,
    #[error("operation not allowed in flow state {0:?}")]
    InvalidState(ReviewFlow),
    #[error("no acta with id {0}")]
    UnknownActa(String),
}

/// Owns the in-memory acta collection (most recent first), the pending
/// draft produced by generation, and the review → signature sequencing.
pub struct MinutesManager {
    actas: Vec<Acta>,
    pending: Option<Acta>,
    flow: ReviewFlow,
    user_name: String,
}

impl MinutesManager {
    /* ---------- construction ------------------------------------------------ */

    pub fn new(user_name: impl Into<String>) -> Self {
        Self::with_actas(user_name, Vec::new())
    }

    pub fn with_actas(user_name: impl Into<String>, actas: Vec<Acta>) -> Self {
        Self {
            actas,
            pending: None,
            flow: ReviewFlow::Idle,
            user_name: user_name.into(),
        }
    }

    pub fn actas(&self) -> &[Acta] {
        &self.actas
    }

    pub fn pending(&self) -> Option<&Acta> {
        self.pending.as_ref()
    }

    pub fn flow(&self) -> ReviewFlow {
        self.flow
    }

    /* ---------- review / edit ----------------------------------------------- */

    /// Hand a freshly generated draft over for review. Replaces any draft a
    /// previous, abandoned run left behind.
    pub fn begin_review(&mut self, draft: Acta) {
        if self.pending.is_some() {
            warn!("Replacing a pending draft that was never signed");
        }
        info!("Draft \"{}\" entering review", draft.title);
        self.pending = Some(draft);
        self.flow = ReviewFlow::Editing;
    }

    /// Commit the edited transcript into the pending draft. The editor is
    /// now tearing down; the signature surface must wait for
    /// `editor_closed`.
    pub fn confirm_edit(&mut self, transcript: impl Into<String>) -> Result<(), FlowError> {
        if self.flow != ReviewFlow::Editing {
            return Err(FlowError::InvalidState(self.flow));
        }
        let pending = self.pending.as_mut().ok_or(FlowError::NoPendingDraft)?;
        pending.transcript = transcript.into();
        self.flow = ReviewFlow::ClosingEditor;
        Ok(())
    }

    /// Abandon the draft: the editor closes and the user must regenerate.
    pub fn cancel_edit(&mut self) {
        if self.pending.take().is_some() {
            info!("Pending draft abandoned from the editor");
        }
        self.flow = ReviewFlow::Idle;
    }

    /// The editor surface reports it is fully unmounted.
    pub fn editor_closed(&mut self) -> Result<(), FlowError> {
        if self.flow != ReviewFlow::ClosingEditor {
            return Err(FlowError::InvalidState(self.flow));
        }
        self.flow = ReviewFlow::Signing;
        Ok(())
    }

    /// Whether the signature surface may mount right now.
    pub fn signature_may_open(&self) -> bool {
        self.flow == ReviewFlow::Signing
    }

    /* ---------- signing ------------------------------------------------------ */

    /// Sign the pending draft and publish it at the head of the collection.
    pub fn sign_pending(&mut self, signature: &str) -> Result<&Acta, FlowError> {
        if self.flow != ReviewFlow::Signing {
            return Err(FlowError::InvalidState(self.flow));
        }
        let pending = self.pending.take().ok_or(FlowError::NoPendingDraft)?;
        let signed = pending.signed(signature, &self.user_name);
        info!("Acta \"{}\" signed and published", signed.title);
        self.actas.insert(0, signed);
        self.flow = ReviewFlow::Idle;
        Ok(&self.actas[0])
    }

    /// Close the signature dialog without signing. The draft stays pending
    /// so the user can reopen the dialog and try again.
    pub fn close_signature(&mut self) {
        if self.flow == ReviewFlow::Signing {
            self.flow = ReviewFlow::Idle;
        }
    }

    /// Reopen the signature dialog for a still-pending draft.
    pub fn reopen_signature(&mut self) -> Result<(), FlowError> {
        if self.flow != ReviewFlow::Idle {
            return Err(FlowError::InvalidState(self.flow));
        }
        if self.pending.is_none() {
            return Err(FlowError::NoPendingDraft);
        }
        self.flow = ReviewFlow::Signing;
        Ok(())
    }

    /// Re-sign an acta that is already listed (detail-view path), replacing
    /// the matching entry in place. The collection length never changes.
    pub fn sign_listed(&mut self, id: &str, signature: &str) -> Result<Acta, FlowError> {
        let entry = self
            .actas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| FlowError::UnknownActa(id.to_string()))?;
        let signed = entry.signed(signature, &self.user_name);
        *entry = signed.clone();
        info!("Acta \"{}\" re-signed", signed.title);
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draft(title: &str) -> Acta {
        Acta::draft(
            title,
            "Resumen de la reunión.",
            vec![
                "Aprobación del acta anterior".to_string(),
                "Revisión de cuentas".to_string(),
            ],
            "El presidente abre la sesión.",
            "Carlos García",
        )
    }

    fn published(title: &str) -> Acta {
        test_draft(title).signed("data:image/png;base64,AAAA", "Carlos García")
    }

    #[test]
    fn test_signed_is_pure_and_complete() {
        let draft = test_draft("Junta Ordinaria");
        let before = draft.clone();

        let signed = draft.signed("data:image/png;base64,Zm9v", "Carlos García");

        assert_eq!(draft, before);
        assert_eq!(signed.status, ActaStatus::Published);
        assert_eq!(
            signed.signature.as_deref(),
            Some("data:image/png;base64,Zm9v")
        );
        assert_eq!(signed.signed_by.as_deref(), Some("Carlos García"));
        assert!(signed.signed_at.is_some());
    }

    #[test]
    fn test_sign_pending_prepends_one_entry() {
        let mut manager =
            MinutesManager::with_actas("Carlos García", vec![published("Enero"), published("Dic")]);
        let draft = test_draft("Junta Marzo 2024");
        let draft_id = draft.id.clone();

        manager.begin_review(draft);
        manager.confirm_edit("Texto corregido").unwrap();
        manager.editor_closed().unwrap();
        let signed = manager.sign_pending("data:image/png;base64,Zm9v").unwrap();
        assert_eq!(signed.id, draft_id);

        assert_eq!(manager.actas().len(), 3);
        assert_eq!(manager.actas()[0].title, "Junta Marzo 2024");
        assert_eq!(manager.actas()[0].transcript, "Texto corregido");
        assert!(manager.pending().is_none());
        assert_eq!(manager.flow(), ReviewFlow::Idle);
    }

    #[test]
    fn test_sign_listed_replaces_in_place() {
        let mut manager =
            MinutesManager::with_actas("Carlos García", vec![published("Enero"), published("Dic")]);
        let target_id = manager.actas()[1].id.clone();

        let resigned = manager
            .sign_listed(&target_id, "data:image/png;base64,bmV3")
            .unwrap();

        assert_eq!(manager.actas().len(), 2);
        assert_eq!(manager.actas()[1].id, target_id);
        assert_eq!(
            manager.actas()[1].signature.as_deref(),
            Some("data:image/png;base64,bmV3")
        );
        assert_eq!(resigned.id, target_id);
    }

    #[test]
    fn test_sign_listed_unknown_id() {
        let mut manager = MinutesManager::new("Carlos García");
        assert!(matches!(
            manager.sign_listed("missing", "sig"),
            Err(FlowError::UnknownActa(_))
        ));
    }

    #[test]
    fn test_signature_waits_for_editor_unmount() {
        let mut manager = MinutesManager::new("Carlos García");
        manager.begin_review(test_draft("Junta"));
        assert!(!manager.signature_may_open());

        manager.confirm_edit("editado").unwrap();
        // Editor confirmed but still tearing down: signing must be refused.
        assert_eq!(manager.flow(), ReviewFlow::ClosingEditor);
        assert!(!manager.signature_may_open());
        assert!(matches!(
            manager.sign_pending("sig"),
            Err(FlowError::InvalidState(ReviewFlow::ClosingEditor))
        ));

        manager.editor_closed().unwrap();
        assert!(manager.signature_may_open());
        manager.sign_pending("data:image/png;base64,Zm9v").unwrap();
    }

    #[test]
    fn test_cancel_edit_clears_pending() {
        let mut manager = MinutesManager::new("Carlos García");
        manager.begin_review(test_draft("Junta"));
        manager.cancel_edit();

        assert!(manager.pending().is_none());
        assert_eq!(manager.flow(), ReviewFlow::Idle);
        assert!(manager.actas().is_empty());
    }

    #[test]
    fn test_close_signature_keeps_pending() {
        let mut manager = MinutesManager::new("Carlos García");
        manager.begin_review(test_draft("Junta"));
        manager.confirm_edit("editado").unwrap();
        manager.editor_closed().unwrap();

        manager.close_signature();
        assert_eq!(manager.flow(), ReviewFlow::Idle);
        assert!(manager.pending().is_some());

        manager.reopen_signature().unwrap();
        assert!(manager.signature_may_open());
    }

    #[test]
    fn test_draft_has_no_signature_fields() {
        let draft = test_draft("Junta");
        assert_eq!(draft.status, ActaStatus::Draft);
        assert!(draft.signature.is_none());
        assert!(draft.signed_by.is_none());
        assert!(draft.signed_at.is_none());
    }

    /// Full happy path: record → generate → edit → confirm → editor closes →
    /// sign → published at the head of the collection.
    #[tokio::test]
    async fn test_record_to_publication_scenario() {
        use crate::editor::TranscriptEditor;
        use crate::generation::{ActaComposer, GenerationRequest, MinutesGenerator};
        use crate::managers::audio::{CaptureBackend, RecorderError, RecordingManager};
        use crate::audio_toolkit::CapturedAudio;
        use crate::signature::SignaturePad;
        use async_trait::async_trait;
        use tempfile::TempDir;

        struct TwelveSecondMic;

        impl CaptureBackend for TwelveSecondMic {
            fn start(&mut self) -> Result<(), RecorderError> {
                Ok(())
            }
            fn stop(&mut self) -> Result<CapturedAudio, RecorderError> {
                Ok(CapturedAudio {
                    samples: vec![0.1f32; 16_000 * 12],
                    sample_rate: 16_000,
                })
            }
            fn cancel(&mut self) {}
            fn duration_ms(&self) -> u64 {
                12_000
            }
        }

        struct CannedGenerator;

        #[async_trait]
        impl MinutesGenerator for CannedGenerator {
            async fn generate(
                &self,
                _comunidad_id: &str,
                request: &GenerationRequest,
            ) -> Result<Acta, crate::generation::GenerationError> {
                Ok(Acta::draft(
                    &request.title,
                    "Resumen generado por IA.",
                    vec!["Aprobación del acta anterior".to_string()],
                    "El presidente abre la sesión.",
                    "Carlos García",
                ))
            }
        }

        let dir = TempDir::new().unwrap();
        let mut recorder =
            RecordingManager::with_backend(Box::new(TwelveSecondMic), dir.path().to_path_buf());
        let mut composer = ActaComposer::new();
        let mut manager = MinutesManager::new("Carlos García");

        // Record 12 s of session audio and attach it.
        assert!(recorder.try_start_recording().unwrap());
        let take = recorder.stop_recording().unwrap();
        assert_eq!(take.duration_ms, 12_000);
        composer.set_title("Junta Marzo 2024");
        composer.attach_recording(take).unwrap();

        // Generate the draft.
        let draft = composer.generate(&CannedGenerator, "123").await.unwrap();
        assert_eq!(draft.status, ActaStatus::Draft);

        // Review and edit the transcript.
        manager.begin_review(draft);
        let mut editor = TranscriptEditor::open(manager.pending().unwrap().transcript.clone());
        editor.set_content("Texto corregido");
        manager.confirm_edit(editor.confirm()).unwrap();
        manager.editor_closed().unwrap();
        assert!(manager.signature_may_open());

        // Sign with non-empty strokes and publish.
        let mut pad = SignaturePad::default();
        pad.add_stroke(vec![(10.0, 10.0), (90.0, 60.0)]);
        let signature = pad.read().unwrap();
        manager.sign_pending(&signature).unwrap();

        let published = &manager.actas()[0];
        assert_eq!(published.title, "Junta Marzo 2024");
        assert_eq!(published.status, ActaStatus::Published);
        assert_eq!(published.transcript, "Texto corregido");
        assert!(published.signature.is_some());
        assert!(manager.pending().is_none());
    }

    #[test]
    fn test_acta_wire_format_is_camel_case() {
        let json = serde_json::to_value(published("Enero")).unwrap();
        assert!(json.get("executiveSummary").is_some());
        assert!(json.get("createdBy").is_some());
        assert!(json.get("signedBy").is_some());
        assert_eq!(json.get("status").unwrap(), "published");
    }
}
