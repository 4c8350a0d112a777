//! Persistence collaborators for the ingestion pipeline.
//!
//! The object store and record table are dependency-injected capabilities
//! owned by the process entry point; the core never holds global clients.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::Acord140Record;
use crate::validate::ValidationReport;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str)
        -> Result<()>;
}

#[async_trait]
pub trait RecordTable: Send + Sync {
    async fn put_item(&self, item: &StoredItem) -> Result<()>;
}

/// Artifact written next to the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionOutput {
    pub source: String,
    pub extracted: Acord140Record,
    pub validation: ValidationReport,
}

/// Row persisted to the record table for each processed document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub document_id: String,
    pub source_key: String,
    pub source_bucket: String,
    pub extracted: Acord140Record,
    pub validation: ValidationReport,
    pub created_at: String,
}

impl StoredItem {
    /// `documentId` is the policy number, falling back to the source key when
    /// the policy number is blank.
    pub fn new(
        extracted: Acord140Record,
        validation: ValidationReport,
        source_bucket: &str,
        source_key: &str,
    ) -> Self {
        let document_id = extracted
            .general_information
            .policy_number
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(source_key)
            .to_string();

        Self {
            document_id,
            source_key: source_key.to_string(),
            source_bucket: source_bucket.to_string(),
            extracted,
            validation,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Key under which the output artifact for a source object is stored.
pub fn results_key(source_key: &str) -> String {
    let file_name = source_key.rsplit('/').next().unwrap_or(source_key);
    let file_name = file_name
        .strip_suffix(".pdf")
        .map(|stem| format!("{}.json", stem))
        .unwrap_or_else(|| format!("{}.json", file_name));
    format!("results/{}", file_name)
}
