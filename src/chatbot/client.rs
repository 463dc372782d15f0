//! Client for the community assistant and its knowledge-base ingestion
//! endpoint.

use crate::http::get_http_client;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Answer shown when the server cannot be reached; the conversation surface
/// never crashes over transport problems.
const FALLBACK_ANSWER: &str = "Lo siento, hubo un error al conectar con el servidor.";

#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("document title and content must not be empty")]
    EmptyDocument,
    #[error("document upload failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document upload rejected with status {0}")]
    Rejected(reqwest::StatusCode),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatAnswerSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default)]
    pub source: Option<ChatAnswerSource>,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

#[derive(Debug, Serialize)]
struct DocumentUpload<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexedDocument {
    /// How many knowledge chunks the document was split into.
    pub chunks: u32,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct ChatbotClient {
    base_url: String,
}

impl ChatbotClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the community assistant a question.
    ///
    /// Transport failures resolve to the stock fallback answer instead of an
    /// error; only an empty question is refused.
    pub async fn ask(&self, comunidad_id: &str, question: &str) -> Result<ChatAnswer, ChatbotError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatbotError::EmptyQuestion);
        }

        let url = format!("{}/comunities/{}/chatbot", self.base_url, comunidad_id);
        let response = get_http_client()
            .post(&url)
            .query(&[("request", question)])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let answer = match response {
            Ok(response) => response.json::<ChatAnswer>().await,
            Err(e) => Err(e),
        };

        match answer {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!("Chatbot request failed: {}", e);
                Ok(ChatAnswer {
                    answer: FALLBACK_ANSWER.to_string(),
                    source: Some(ChatAnswerSource {
                        kind: "Error".to_string(),
                        reference: None,
                    }),
                    disclaimer: None,
                })
            }
        }
    }

    /// Index a document into the community knowledge base.
    pub async fn upload_document(
        &self,
        comunidad_id: &str,
        title: &str,
        content: &str,
    ) -> Result<IndexedDocument, ChatbotError> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(ChatbotError::EmptyDocument);
        }

        let url = format!("{}/comunities/{}/documents", self.base_url, comunidad_id);
        let response = get_http_client()
            .post(&url)
            .json(&DocumentUpload { title, content })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatbotError::Rejected(response.status()));
        }

        let indexed: IndexedDocument = response.json().await?;
        info!(
            "Document \"{}\" indexed into {} chunks",
            title, indexed.chunks
        );
        Ok(indexed)
    }
}
