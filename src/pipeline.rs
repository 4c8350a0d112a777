//! End-to-end orchestration for local documents: mode selection, extraction,
//! validation.

use std::path::Path;

use log::info;

use crate::error::{AcordExtractError, Result};
use crate::llm::client::CompletionClient;
use crate::llm::extractor::{LlmExtractor, RetryPolicy};
use crate::mode::{select_mode, ExtractionMode};
use crate::pdf::{self, PageRasterizer};
use crate::schema::Acord140Record;
use crate::storage::ExtractionOutput;
use crate::validate::{full_validation, ValidationReport};

pub struct Pipeline<C> {
    extractor: LlmExtractor<C>,
    rasterizer: Option<Box<dyn PageRasterizer>>,
    retry: RetryPolicy,
}

impl<C: CompletionClient> Pipeline<C> {
    pub fn new(extractor: LlmExtractor<C>) -> Self {
        Self {
            extractor,
            rasterizer: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Enable the vision channel. Without a rasterizer, documents whose text
    /// layer is unusable fail with a configuration error.
    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Extract and validate an in-memory PDF.
    pub async fn extract_from_bytes(
        &self,
        pdf: &[u8],
    ) -> Result<(Acord140Record, ValidationReport)> {
        let text = pdf::extract_text_bytes(pdf)?;
        info!("Extracted text length: {}", text.len());

        let record = match select_mode(&text) {
            ExtractionMode::Text => {
                info!("Text layer looks usable, extracting in text mode");
                self.extractor.extract_from_text(&text).await?
            }
            ExtractionMode::Vision => {
                info!("Text layer insufficient, extracting in vision mode");
                let rasterizer = self.rasterizer.as_ref().ok_or_else(|| {
                    AcordExtractError::Config(
                        "vision mode required but no page rasterizer configured".to_string(),
                    )
                })?;
                let images = rasterizer.page_images(pdf)?;
                info!("Rendered {} page image(s)", images.len());
                self.extractor
                    .extract_with_validation(&images, &self.retry)
                    .await?
            }
        };

        let validation = full_validation(&record);
        Ok((record, validation))
    }

    pub async fn extract_from_pdf(&self, path: &Path) -> Result<ExtractionOutput> {
        info!("Processing PDF: {}", path.display());
        let bytes = std::fs::read(path)?;
        let (extracted, validation) = self.extract_from_bytes(&bytes).await?;
        Ok(ExtractionOutput {
            source: path.display().to_string(),
            extracted,
            validation,
        })
    }

    /// Extract a single page image directly through the vision channel.
    pub async fn extract_from_image(&self, path: &Path) -> Result<ExtractionOutput> {
        info!("Processing image: {}", path.display());
        let image = pdf::load_image_as_base64(path)?;
        let extracted = self
            .extractor
            .extract_with_validation(&[image], &self.retry)
            .await?;
        let validation = full_validation(&extracted);
        Ok(ExtractionOutput {
            source: path.display().to_string(),
            extracted,
            validation,
        })
    }
}

/// Structured error object for the outermost boundary, so callers log JSON
/// rather than an unstructured crash.
pub fn error_object(err: &AcordExtractError) -> serde_json::Value {
    serde_json::json!({ "error": err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::sample_pdf;
    use crate::validate::OverallStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const REPLY: &str = r#"{"generalInformation": {
        "agencyCustomerId": "AC-1", "agencyName": "Agency", "applicant": "ACME",
        "policyNumber": "POL-88421", "carrier": "Statewide", "naicCode": "12345",
        "effectiveDate": "01/01/2024", "expirationDate": "01/01/2025",
        "directBill": "yes", "agencyBill": false,
        "paymentPlan": "annual", "audit": "yes"
    }, "construction": {"propertySection": {"wiringYear": "2001"}}}"#;

    #[derive(Default)]
    struct ChannelSpy {
        text_calls: AtomicUsize,
        image_calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for &ChannelSpy {
        async fn complete_from_images(&self, _images: &[String], _prompt: &str) -> Result<String> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            Ok(REPLY.to_string())
        }

        async fn complete_from_text(&self, _text: &str, _prompt: &str) -> Result<String> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            Ok(REPLY.to_string())
        }
    }

    struct OnePageRasterizer;

    impl PageRasterizer for OnePageRasterizer {
        fn page_images(&self, _pdf: &[u8]) -> Result<Vec<String>> {
            Ok(vec!["cGFnZQ==".to_string()])
        }
    }

    fn labeled_long_text() -> String {
        format!("ACORD 140 Property Section {}", "policy detail ".repeat(30))
    }

    #[tokio::test]
    async fn test_usable_text_layer_takes_text_channel() {
        let spy = ChannelSpy::default();
        let pipeline = Pipeline::new(LlmExtractor::new(&spy)).with_rasterizer(OnePageRasterizer);

        let pdf = sample_pdf(&labeled_long_text(), &[]);
        let (record, validation) = pipeline.extract_from_bytes(&pdf).await.unwrap();

        assert_eq!(spy.text_calls.load(Ordering::SeqCst), 1);
        assert_eq!(spy.image_calls.load(Ordering::SeqCst), 0);
        assert_eq!(record.general_information.direct_bill, Some(true));
        assert!(validation.valid);
        assert_eq!(validation.overall_status, OverallStatus::Pass);
    }

    #[tokio::test]
    async fn test_thin_text_layer_takes_vision_channel() {
        let spy = ChannelSpy::default();
        let pipeline = Pipeline::new(LlmExtractor::new(&spy)).with_rasterizer(OnePageRasterizer);

        let pdf = sample_pdf("scanned", &[]);
        let (_, validation) = pipeline.extract_from_bytes(&pdf).await.unwrap();

        assert_eq!(spy.text_calls.load(Ordering::SeqCst), 0);
        assert_eq!(spy.image_calls.load(Ordering::SeqCst), 1);
        assert!(validation.valid);
    }

    #[tokio::test]
    async fn test_vision_without_rasterizer_is_a_config_error() {
        let spy = ChannelSpy::default();
        let pipeline = Pipeline::new(LlmExtractor::new(&spy));

        let pdf = sample_pdf("scanned", &[]);
        let err = pipeline.extract_from_bytes(&pdf).await.unwrap_err();
        assert!(matches!(err, AcordExtractError::Config(_)));
        assert_eq!(spy.image_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_object_shape() {
        let value = error_object(&AcordExtractError::NoJsonFound);
        assert_eq!(value["error"], "No JSON found in LLM response");
    }
}
