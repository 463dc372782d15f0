use crate::audio_toolkit::audio::{save_wav_file, AudioRecorder, CapturedAudio};
use log::{debug, info};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/* ──────────────────────────────────────────────────────────────── */

#[derive(Debug, Error)]
pub enum RecorderError {
    /// Microphone missing or access denied; the caller shows an alert and
    /// stays in the not-recording state.
    #[error("microphone unavailable: {0}")]
    MicrophoneUnavailable(String),
    #[error("no active recording")]
    NotRecording,
    #[error("recording produced no audio")]
    EmptyRecording,
    #[error("failed to finalize recording: {0}")]
    Finalize(#[from] anyhow::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// A finished recording: a playable locator plus its measured duration.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub locator: PathBuf,
    pub duration_ms: u64,
}

/// One capture implementation behind the recording manager. The default is
/// the cpal microphone; tests (and platforms without a capture device)
/// script their own.
pub trait CaptureBackend {
    fn start(&mut self) -> Result<(), RecorderError>;
    fn stop(&mut self) -> Result<CapturedAudio, RecorderError>;
    fn cancel(&mut self);
    /// Milliseconds captured so far, live while recording.
    fn duration_ms(&self) -> u64;
}

/* ──────────────────────────────────────────────────────────────── */

pub struct MicrophoneBackend {
    recorder: AudioRecorder,
}

impl MicrophoneBackend {
    pub fn new() -> Self {
        Self {
            recorder: AudioRecorder::new(),
        }
    }
}

impl Default for MicrophoneBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for MicrophoneBackend {
    fn start(&mut self) -> Result<(), RecorderError> {
        self.recorder
            .open(None)
            .map_err(|e| RecorderError::MicrophoneUnavailable(e.to_string()))?;
        self.recorder
            .start()
            .map_err(|e| RecorderError::MicrophoneUnavailable(e.to_string()))
    }

    fn stop(&mut self) -> Result<CapturedAudio, RecorderError> {
        let captured = self
            .recorder
            .stop()
            .map_err(|e| RecorderError::MicrophoneUnavailable(e.to_string()));
        self.recorder.close();
        captured
    }

    fn cancel(&mut self) {
        let _ = self.recorder.stop();
        self.recorder.close();
    }

    fn duration_ms(&self) -> u64 {
        self.recorder.duration_ms()
    }
}

/* ──────────────────────────────────────────────────────────────── */

/// Serializes the record/stop lifecycle of the creation dialog.
///
/// At most one recording is active at a time; starting while busy is a
/// no-op (`Ok(false)`), matching the disabled trigger in the UI. Stopping
/// finalizes the take into a WAV locator the rest of the workflow can play
/// and upload.
pub struct RecordingManager {
    state: RecordingState,
    backend: Box<dyn CaptureBackend>,
    output_dir: PathBuf,
}

impl RecordingManager {
    /* ---------- construction ------------------------------------------------ */

    pub fn new() -> Self {
        Self::with_backend(Box::new(MicrophoneBackend::new()), std::env::temp_dir())
    }

    pub fn with_backend(backend: Box<dyn CaptureBackend>, output_dir: PathBuf) -> Self {
        Self {
            state: RecordingState::Idle,
            backend,
            output_dir,
        }
    }

    /* ---------- recording --------------------------------------------------- */

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Live duration counter for the recording button label.
    pub fn duration_ms(&self) -> u64 {
        self.backend.duration_ms()
    }

    /// Start capturing. Returns `Ok(false)` when already recording.
    pub fn try_start_recording(&mut self) -> Result<bool, RecorderError> {
        if self.state == RecordingState::Recording {
            debug!("Recording already active, ignoring start");
            return Ok(false);
        }
        self.backend.start()?;
        self.state = RecordingState::Recording;
        debug!("Recording started");
        Ok(true)
    }

    /// Stop capturing and finalize the take into a WAV locator.
    ///
    /// Any failure resets the manager to `Idle` so the user can simply record
    /// again.
    pub fn stop_recording(&mut self) -> Result<RecordingResult, RecorderError> {
        if self.state != RecordingState::Recording {
            return Err(RecorderError::NotRecording);
        }
        self.state = RecordingState::Idle;

        let captured = self.backend.stop()?;
        if captured.samples.is_empty() || captured.sample_rate == 0 {
            return Err(RecorderError::EmptyRecording);
        }

        let duration_ms =
            captured.samples.len() as u64 * 1000 / captured.sample_rate as u64;
        let locator = self
            .output_dir
            .join(format!("acta_rec_{}.wav", Uuid::new_v4()));
        save_wav_file(&locator, &captured.samples, captured.sample_rate)?;

        info!(
            "Recording finalized: {} ({} ms)",
            locator.display(),
            duration_ms
        );
        Ok(RecordingResult {
            locator,
            duration_ms,
        })
    }

    /// Discard any ongoing recording without producing a locator.
    pub fn cancel_recording(&mut self) {
        if self.state == RecordingState::Recording {
            self.backend.cancel();
            self.state = RecordingState::Idle;
            debug!("Recording cancelled");
        }
    }
}

impl Default for RecordingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecordingManager {
    fn drop(&mut self) {
        // Navigating away mid-recording must release the microphone.
        self.cancel_recording();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct ScriptedBackend {
        samples: Vec<f32>,
        sample_rate: u32,
        capturing: bool,
    }

    impl ScriptedBackend {
        fn with_seconds(seconds: u32) -> Self {
            Self {
                samples: vec![0.1f32; (16_000 * seconds) as usize],
                sample_rate: 16_000,
                capturing: false,
            }
        }
    }

    impl CaptureBackend for ScriptedBackend {
        fn start(&mut self) -> Result<(), RecorderError> {
            self.capturing = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<CapturedAudio, RecorderError> {
            self.capturing = false;
            Ok(CapturedAudio {
                samples: self.samples.clone(),
                sample_rate: self.sample_rate,
            })
        }

        fn cancel(&mut self) {
            self.capturing = false;
        }

        fn duration_ms(&self) -> u64 {
            self.samples.len() as u64 * 1000 / self.sample_rate as u64
        }
    }

    struct DeniedBackend;

    impl CaptureBackend for DeniedBackend {
        fn start(&mut self) -> Result<(), RecorderError> {
            Err(RecorderError::MicrophoneUnavailable(
                "access denied".to_string(),
            ))
        }

        fn stop(&mut self) -> Result<CapturedAudio, RecorderError> {
            Err(RecorderError::NotRecording)
        }

        fn cancel(&mut self) {}

        fn duration_ms(&self) -> u64 {
            0
        }
    }

    fn manager_with(backend: Box<dyn CaptureBackend>, dir: &TempDir) -> RecordingManager {
        RecordingManager::with_backend(backend, dir.path().to_path_buf())
    }

    #[test]
    fn test_record_stop_produces_playable_locator() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_with(Box::new(ScriptedBackend::with_seconds(12)), &dir);

        assert!(manager.try_start_recording().unwrap());
        assert!(manager.is_recording());

        let result = manager.stop_recording().unwrap();
        assert_eq!(result.duration_ms, 12_000);
        assert!(result.locator.exists());
        assert!(!manager.is_recording());
    }

    #[test]
    fn test_start_while_recording_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_with(Box::new(ScriptedBackend::with_seconds(1)), &dir);

        assert!(manager.try_start_recording().unwrap());
        assert!(!manager.try_start_recording().unwrap());
        assert!(manager.is_recording());
    }

    #[test]
    fn test_empty_capture_fails_and_resets() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_with(Box::new(ScriptedBackend::with_seconds(0)), &dir);

        manager.try_start_recording().unwrap();
        assert!(matches!(
            manager.stop_recording(),
            Err(RecorderError::EmptyRecording)
        ));
        assert!(!manager.is_recording());
        assert!(manager.try_start_recording().unwrap());
    }

    #[test]
    fn test_denied_microphone_stays_idle() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_with(Box::new(DeniedBackend), &dir);

        assert!(matches!(
            manager.try_start_recording(),
            Err(RecorderError::MicrophoneUnavailable(_))
        ));
        assert!(!manager.is_recording());
    }

    #[test]
    fn test_stop_without_start() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_with(Box::new(ScriptedBackend::with_seconds(1)), &dir);

        assert!(matches!(
            manager.stop_recording(),
            Err(RecorderError::NotRecording)
        ));
    }

    #[test]
    fn test_cancel_discards_take() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_with(Box::new(ScriptedBackend::with_seconds(3)), &dir);

        manager.try_start_recording().unwrap();
        manager.cancel_recording();
        assert!(!manager.is_recording());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
