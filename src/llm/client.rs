//! Completion-service interface and the Gemini implementation.
//!
//! The core never branches on a concrete provider: it talks to the
//! [`CompletionClient`] capability, and `GeminiClient` is one implementation
//! behind it.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AcordExtractError, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Text/vision completion capability consumed by the extractor.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete against base64-encoded page images plus the prompt.
    async fn complete_from_images(&self, images: &[String], prompt: &str) -> Result<String>;

    /// Complete against raw document text plus the prompt.
    async fn complete_from_text(&self, text: &str, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Construct from `GEMINI_API_KEY` and optional `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            AcordExtractError::Config(
                "GEMINI_API_KEY environment variable is required".to_string(),
            )
        })?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    async fn generate_content(&self, parts: Vec<Part>) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            safety_settings: SafetySetting::block_none(),
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            if status.as_u16() == 429 || err_text.to_lowercase().contains("quota") {
                return Err(AcordExtractError::RateLimited(format!(
                    "status {}: {}",
                    status, err_text
                )));
            }
            return Err(AcordExtractError::CompletionService {
                status: status.as_u16(),
                message: err_text,
            });
        }

        let body: GenerateContentResponse = res.json().await?;
        debug!("Gemini returned {} candidate(s)", body.candidates.len());

        let text = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AcordExtractError::CompletionService {
                status: status.as_u16(),
                message: "No candidates returned".to_string(),
            })?
            .content
            .parts
            .into_iter()
            .find_map(|part| match part {
                Part::Text { text } => Some(text),
                _ => None,
            })
            .ok_or_else(|| AcordExtractError::CompletionService {
                status: status.as_u16(),
                message: "Model returned non-text content".to_string(),
            })?;

        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete_from_images(&self, images: &[String], prompt: &str) -> Result<String> {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        for image in images {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: "image/png".to_string(),
                    data: image.clone(),
                },
            });
        }
        self.generate_content(parts).await
    }

    async fn complete_from_text(&self, text: &str, prompt: &str) -> Result<String> {
        let parts = vec![
            Part::Text {
                text: prompt.to_string(),
            },
            Part::Text {
                text: crate::llm::prompts::text_mode_input(text),
            },
        ];
        self.generate_content(parts).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl SafetySetting {
    /// Form pages trip content filters surprisingly often; disable them.
    fn block_none() -> Vec<SafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}
