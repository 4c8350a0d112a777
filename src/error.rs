use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcordExtractError {
    #[error("No JSON found in LLM response")]
    NoJsonFound,

    #[error("Malformed JSON in LLM response: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("Normalized response failed schema construction: {0}")]
    SchemaConstruction(#[source] serde_json::Error),

    #[error("Extraction failed after {attempts} attempts: {last_error}")]
    ExtractionExhausted { attempts: usize, last_error: String },

    #[error("Completion service error (status {status}): {message}")]
    CompletionService { status: u16, message: String },

    #[error("Completion service rate limited: {0}")]
    RateLimited(String),

    #[error("PDF processing error: {0}")]
    Pdf(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AcordExtractError {
    /// Whether this failure is a quota/rate-limit condition the caller should
    /// surface as a "try again later" outcome instead of a hard failure.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AcordExtractError::RateLimited(_) => true,
            AcordExtractError::CompletionService { status, message } => {
                *status == 429 || message.to_lowercase().contains("quota")
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AcordExtractError>;
