//! # ACORD Extract
//!
//! A library for extracting structured ACORD 140 (Property) data from
//! insurance PDFs via an LLM, with normalization and multi-tier validation.
//!
//! ## Core Concepts
//!
//! - **Mode Selection**: Documents with a usable text layer go through the
//!   cheaper text channel; scans and thin text layers go through the vision
//!   channel with rendered page images
//! - **Permissive Schema**: A typed core of known ACORD 140 fields plus open
//!   side-channels that keep whatever else the model returns
//! - **Normalization**: Missing keys are filled with defaults so downstream
//!   consumers see a total shape; present values (including nulls) are never
//!   overwritten
//! - **Validation Tiers**: Required-field failures are errors; consistency
//!   and construction findings are warnings. The two tiers derive an overall
//!   status of `PASS`, `PASS_WITH_WARNINGS` or `FAIL`
//!
//! ## Example
//!
//! ```rust,ignore
//! use acord_extract::{GeminiClient, LlmExtractor, Pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> acord_extract::Result<()> {
//!     let client = GeminiClient::from_env()?;
//!     let pipeline = Pipeline::new(LlmExtractor::new(client));
//!
//!     let output = pipeline.extract_from_pdf(Path::new("acord140.pdf")).await?;
//!     println!("{}", serde_json::to_string_pretty(&output)?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handler;
pub mod llm;
pub mod mode;
pub mod normalize;
pub mod parse;
pub mod pdf;
pub mod pipeline;
pub mod schema;
pub mod storage;
pub mod validate;

pub use error::{AcordExtractError, Result};
pub use handler::DocumentHandler;
pub use llm::client::{CompletionClient, GeminiClient};
pub use llm::extractor::{LlmExtractor, RetryPolicy};
pub use mode::{select_mode, ExtractionMode};
pub use normalize::normalize_response;
pub use parse::{json_span, parse_reply};
pub use pdf::{extract_text, extract_text_bytes, load_image_as_base64, PageRasterizer};
pub use pipeline::{error_object, Pipeline};
pub use schema::{Acord140Record, GeneralInformation, SpoilageCoverage, ACORD_FORM_TYPE};
pub use storage::{results_key, ExtractionOutput, ObjectStore, RecordTable, StoredItem};
pub use validate::{full_validation, OverallStatus, ValidationReport};
