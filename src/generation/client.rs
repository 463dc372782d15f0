//! The minutes-generation collaborator: submit title + audio, await a
//! structured draft acta.

use crate::http::get_http_client;
use crate::managers::minutes::{Acta, ActaStatus};
use async_trait::async_trait;
use log::info;
use reqwest::multipart;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not read audio at {path}: {source}")]
    Audio {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("generation service returned a document that is not an unsigned draft")]
    NotADraft,
}

/// Request sent to the generation collaborator.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub title: String,
    /// Locator of the session audio (recorded take or uploaded file).
    pub audio: PathBuf,
}

/// Asynchronous seam to the generation service. Production uses HTTP; tests
/// script their own implementations.
#[async_trait]
pub trait MinutesGenerator: Send + Sync {
    async fn generate(
        &self,
        comunidad_id: &str,
        request: &GenerationRequest,
    ) -> Result<Acta, GenerationError>;
}

/// HTTP implementation: multipart POST of the audio plus the title to
/// `{base}/comunities/{id}/actas`, answered with the draft acta as JSON.
pub struct HttpMinutesGenerator {
    base_url: String,
}

impl HttpMinutesGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MinutesGenerator for HttpMinutesGenerator {
    async fn generate(
        &self,
        comunidad_id: &str,
        request: &GenerationRequest,
    ) -> Result<Acta, GenerationError> {
        let bytes = tokio::fs::read(&request.audio)
            .await
            .map_err(|source| GenerationError::Audio {
                path: request.audio.clone(),
                source,
            })?;

        let file_name = request
            .audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let audio_part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(&request.audio))?;
        let form = multipart::Form::new()
            .text("title", request.title.clone())
            .part("audio", audio_part);

        let url = format!("{}/comunities/{}/actas", self.base_url, comunidad_id);
        info!("Requesting acta generation: {}", url);

        let response = get_http_client().post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Rejected { status, body });
        }

        let draft: Acta = response.json().await?;
        if draft.status != ActaStatus::Draft || draft.signature.is_some() {
            return Err(GenerationError::NotADraft);
        }
        info!("Received draft acta \"{}\" ({})", draft.title, draft.id);
        Ok(draft)
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}
