//! Object-storage event handler: fetch the document, run the pipeline,
//! persist the artifact and the table row.

use std::sync::Arc;

use log::info;

use crate::error::Result;
use crate::llm::client::CompletionClient;
use crate::pipeline::Pipeline;
use crate::storage::{results_key, ExtractionOutput, ObjectStore, RecordTable, StoredItem};

pub struct DocumentHandler<C> {
    pipeline: Pipeline<C>,
    store: Arc<dyn ObjectStore>,
    table: Arc<dyn RecordTable>,
    /// Bucket for output artifacts; skip artifact writing when unset.
    output_bucket: Option<String>,
}

impl<C: CompletionClient> DocumentHandler<C> {
    pub fn new(
        pipeline: Pipeline<C>,
        store: Arc<dyn ObjectStore>,
        table: Arc<dyn RecordTable>,
    ) -> Self {
        Self {
            pipeline,
            store,
            table,
            output_bucket: None,
        }
    }

    pub fn with_output_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.output_bucket = Some(bucket.into());
        self
    }

    /// Process one created-object notification.
    pub async fn handle_created_object(&self, bucket: &str, key: &str) -> Result<StoredItem> {
        let source = format!("s3://{}/{}", bucket, key);
        info!("Processing {}", source);

        let pdf = self.store.fetch(bucket, key).await?;
        let (extracted, validation) = self.pipeline.extract_from_bytes(&pdf).await?;

        if let Some(output_bucket) = &self.output_bucket {
            let output = ExtractionOutput {
                source: source.clone(),
                extracted: extracted.clone(),
                validation: validation.clone(),
            };
            let out_key = results_key(key);
            self.store
                .put(
                    output_bucket,
                    &out_key,
                    serde_json::to_vec_pretty(&output)?,
                    "application/json",
                )
                .await?;
            info!("Saved output to s3://{}/{}", output_bucket, out_key);
        }

        let item = StoredItem::new(extracted, validation, bucket, key);
        self.table.put_item(&item).await?;
        info!("Saved record with documentId={}", item.document_id);

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcordExtractError;
    use crate::llm::extractor::LlmExtractor;
    use crate::pdf::sample_pdf;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const REPLY: &str = r#"{"generalInformation": {
        "agencyCustomerId": "AC-1", "agencyName": "Agency", "applicant": "ACME",
        "policyNumber": "POL-88421", "carrier": "Statewide", "naicCode": "12345",
        "effectiveDate": "01/01/2024", "expirationDate": "01/01/2025",
        "directBill": true, "agencyBill": false,
        "paymentPlan": "annual", "audit": "yes"
    }, "construction": {"propertySection": {"wiringYear": "2001"}}}"#;

    struct FixedClient(&'static str);

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete_from_images(&self, _images: &[String], _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        async fn complete_from_text(&self, _text: &str, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    }

    impl MemoryStore {
        fn seed(&self, bucket: &str, key: &str, body: Vec<u8>) {
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), body);
        }

        fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
            self.objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
            self.get(bucket, key).ok_or_else(|| {
                AcordExtractError::Storage(format!("no such object {}/{}", bucket, key))
            })
        }

        async fn put(
            &self,
            bucket: &str,
            key: &str,
            body: Vec<u8>,
            _content_type: &str,
        ) -> Result<()> {
            self.seed(bucket, key, body);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryTable {
        items: Mutex<Vec<StoredItem>>,
    }

    #[async_trait]
    impl RecordTable for MemoryTable {
        async fn put_item(&self, item: &StoredItem) -> Result<()> {
            self.items.lock().unwrap().push(item.clone());
            Ok(())
        }
    }

    fn labeled_long_text() -> String {
        format!("ACORD 140 Property Section {}", "policy detail ".repeat(30))
    }

    #[tokio::test]
    async fn test_happy_path_persists_artifact_and_item() {
        let store = Arc::new(MemoryStore::default());
        let table = Arc::new(MemoryTable::default());
        store.seed(
            "intake",
            "incoming/form.pdf",
            sample_pdf(&labeled_long_text(), &[]),
        );

        let pipeline = Pipeline::new(LlmExtractor::new(FixedClient(REPLY)));
        let handler = DocumentHandler::new(pipeline, store.clone(), table.clone())
            .with_output_bucket("processed");

        let item = handler
            .handle_created_object("intake", "incoming/form.pdf")
            .await
            .unwrap();

        assert_eq!(item.document_id, "POL-88421");
        assert_eq!(item.source_bucket, "intake");
        assert!(item.validation.valid);

        let artifact = store.get("processed", "results/form.json").unwrap();
        let artifact: serde_json::Value = serde_json::from_slice(&artifact).unwrap();
        assert_eq!(artifact["source"], "s3://intake/incoming/form.pdf");
        assert_eq!(
            artifact["extracted"]["generalInformation"]["policyNumber"],
            "POL-88421"
        );
        assert_eq!(artifact["validation"]["overallStatus"], "PASS");

        assert_eq!(table.items.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_document_id_falls_back_to_key_for_blank_policy() {
        let reply = r#"{"generalInformation": {"policyNumber": ""}}"#;
        let store = Arc::new(MemoryStore::default());
        let table = Arc::new(MemoryTable::default());
        store.seed("intake", "form.pdf", sample_pdf(&labeled_long_text(), &[]));

        let pipeline = Pipeline::new(LlmExtractor::new(FixedClient(reply)));
        let handler = DocumentHandler::new(pipeline, store, table);

        let item = handler
            .handle_created_object("intake", "form.pdf")
            .await
            .unwrap();
        assert_eq!(item.document_id, "form.pdf");
        // Required fields were blank, so the row records the failure.
        assert!(!item.validation.valid);
    }

    #[tokio::test]
    async fn test_missing_object_surfaces_storage_error() {
        let store = Arc::new(MemoryStore::default());
        let table = Arc::new(MemoryTable::default());
        let pipeline = Pipeline::new(LlmExtractor::new(FixedClient(REPLY)));
        let handler = DocumentHandler::new(pipeline, store, table);

        let err = handler
            .handle_created_object("intake", "missing.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, AcordExtractError::Storage(_)));
    }
}
