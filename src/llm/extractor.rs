//! Extraction orchestrator: prompt, completion call, parse, normalize.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::time::sleep;

use crate::error::{AcordExtractError, Result};
use crate::llm::client::CompletionClient;
use crate::llm::prompts::EXTRACTION_PROMPT;
use crate::parse::parse_reply;
use crate::schema::Acord140Record;

/// Retry behavior for the vision extraction path.
///
/// Backoff is linear: attempt `n` waits `backoff * n` before the next try.
/// Defaults to two attempts with no delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::ZERO,
        }
    }
}

pub struct LlmExtractor<C> {
    client: C,
    prompt: String,
    results_dir: Option<PathBuf>,
}

impl<C: CompletionClient> LlmExtractor<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            prompt: EXTRACTION_PROMPT.to_string(),
            results_dir: None,
        }
    }

    /// Replace the default extraction prompt (e.g. for a form revision).
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Write a timestamped JSON artifact of every successful extraction into
    /// this directory. Off by default; failures are logged, never fatal.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    pub async fn extract_from_text(&self, text: &str) -> Result<Acord140Record> {
        let reply = self.client.complete_from_text(text, &self.prompt).await?;
        debug!("raw LLM reply ({} chars)", reply.len());

        let record = parse_reply(&reply)?;
        self.persist_artifact(&record).await;
        Ok(record)
    }

    pub async fn extract_from_images(&self, images: &[String]) -> Result<Acord140Record> {
        let reply = self
            .client
            .complete_from_images(images, &self.prompt)
            .await?;
        debug!("raw LLM reply ({} chars)", reply.len());

        let record = parse_reply(&reply)?;
        self.persist_artifact(&record).await;
        Ok(record)
    }

    /// Image extraction with a bounded retry budget.
    ///
    /// Rate-limit failures surface immediately so the caller can schedule a
    /// later run instead of burning the remaining attempts.
    pub async fn extract_with_validation(
        &self,
        images: &[String],
        policy: &RetryPolicy,
    ) -> Result<Acord140Record> {
        let mut last_error = String::from("no attempts were made");

        for attempt in 1..=policy.max_attempts {
            match self.extract_from_images(images).await {
                Ok(record) => return Ok(record),
                Err(err) if err.is_rate_limited() => return Err(err),
                Err(err) => {
                    warn!(
                        "Extraction attempt {}/{} failed: {}",
                        attempt, policy.max_attempts, err
                    );
                    last_error = err.to_string();
                    if attempt < policy.max_attempts && !policy.backoff.is_zero() {
                        sleep(policy.backoff * attempt as u32).await;
                    }
                }
            }
        }

        Err(AcordExtractError::ExtractionExhausted {
            attempts: policy.max_attempts,
            last_error,
        })
    }

    async fn persist_artifact(&self, record: &Acord140Record) {
        let Some(dir) = &self.results_dir else {
            return;
        };

        let result = async {
            tokio::fs::create_dir_all(dir).await?;
            let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("acord140_output_{}.json", timestamp));
            let body = serde_json::to_vec_pretty(record)?;
            tokio::fs::write(&path, body).await?;
            info!("Saved extraction artifact to {}", path.display());
            Ok::<_, AcordExtractError>(())
        }
        .await;

        if let Err(err) = result {
            warn!("Failed to persist extraction artifact: {}", err);
        }
    }
}
