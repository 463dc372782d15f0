//! State behind the "new acta" dialog: a title, at most one audio source,
//! at most one non-audio attachment, and the in-flight latch for the
//! generation request.

use super::client::{GenerationError, GenerationRequest, MinutesGenerator};
use crate::managers::audio::RecordingResult;
use crate::managers::minutes::Acta;
use crate::utils::is_audio_file;
use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The one audio source a draft can be generated from. A recorded take
/// knows its duration up front; an uploaded file has to be probed.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    Recorded { locator: PathBuf, duration_ms: u64 },
    Uploaded { locator: PathBuf, file_name: String },
}

impl AudioSource {
    pub fn locator(&self) -> &Path {
        match self {
            AudioSource::Recorded { locator, .. } => locator,
            AudioSource::Uploaded { locator, .. } => locator,
        }
    }

    /// Duration hint for the playback preview.
    pub fn duration_hint_ms(&self) -> Option<u64> {
        match self {
            AudioSource::Recorded { duration_ms, .. } => Some(*duration_ms),
            AudioSource::Uploaded { .. } => None,
        }
    }
}

/// A picked file that is not audio; shown as a plain attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedFile {
    pub locator: PathBuf,
    pub file_name: String,
}

/// What a successful pick turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickedKind {
    Audio,
    Attachment,
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("a meeting title is required")]
    MissingTitle,
    #[error("an audio source is required")]
    MissingAudio,
    #[error("an audio source is already attached; delete it first")]
    SourceAlreadyAttached,
    #[error("a generation request is already in flight")]
    AlreadyGenerating,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Default)]
pub struct ActaComposer {
    title: String,
    audio: Option<AudioSource>,
    attachment: Option<AttachedFile>,
    generating: bool,
}

impl ActaComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn audio(&self) -> Option<&AudioSource> {
        self.audio.as_ref()
    }

    pub fn attachment(&self) -> Option<&AttachedFile> {
        self.attachment.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Attach a finished recording. A source already in the slot is only
    /// ever replaced through explicit deletion, never implicitly.
    pub fn attach_recording(&mut self, recording: RecordingResult) -> Result<(), ComposeError> {
        if self.audio.is_some() {
            return Err(ComposeError::SourceAlreadyAttached);
        }
        self.audio = Some(AudioSource::Recorded {
            locator: recording.locator,
            duration_ms: recording.duration_ms,
        });
        Ok(())
    }

    /// A file picked from storage. Audio goes into the audio slot; anything
    /// else becomes a plain attachment. Pick cancellation never reaches
    /// here; it is a no-op upstream.
    pub fn attach_pick(
        &mut self,
        locator: PathBuf,
        file_name: impl Into<String>,
    ) -> Result<PickedKind, ComposeError> {
        let file_name = file_name.into();
        if is_audio_file(&file_name) {
            if self.audio.is_some() {
                return Err(ComposeError::SourceAlreadyAttached);
            }
            self.audio = Some(AudioSource::Uploaded { locator, file_name });
            Ok(PickedKind::Audio)
        } else {
            self.attachment = Some(AttachedFile { locator, file_name });
            Ok(PickedKind::Attachment)
        }
    }

    /// Explicit user deletion of the audio source.
    pub fn remove_audio(&mut self) {
        self.audio = None;
    }

    pub fn remove_attachment(&mut self) {
        self.attachment = None;
    }

    /// The generate button is enabled iff a title and a playable audio
    /// source are present and no request is pending.
    pub fn can_generate(&self) -> bool {
        !self.title.trim().is_empty() && self.audio.is_some() && !self.generating
    }

    /// Submit to the generation collaborator.
    ///
    /// Refused outright (no request sent) without a title or audio. On
    /// failure the entered title, audio and attachment all survive so the
    /// user can resubmit; only success clears the dialog.
    pub async fn generate(
        &mut self,
        generator: &dyn MinutesGenerator,
        comunidad_id: &str,
    ) -> Result<Acta, ComposeError> {
        if self.generating {
            return Err(ComposeError::AlreadyGenerating);
        }
        if self.title.trim().is_empty() {
            return Err(ComposeError::MissingTitle);
        }
        let audio = self.audio.as_ref().ok_or(ComposeError::MissingAudio)?;

        let request = GenerationRequest {
            title: self.title.trim().to_string(),
            audio: audio.locator().to_path_buf(),
        };

        self.generating = true;
        let result = generator.generate(comunidad_id, &request).await;
        self.generating = false;

        match result {
            Ok(draft) => {
                info!("Acta generated for \"{}\"", request.title);
                self.reset();
                Ok(draft)
            }
            Err(e) => {
                warn!("Acta generation failed, keeping dialog input: {}", e);
                Err(e.into())
            }
        }
    }

    /// Clear the dialog back to its initial state.
    pub fn reset(&mut self) {
        self.title.clear();
        self.audio = None;
        self.attachment = None;
        self.generating = false;
    }
}
