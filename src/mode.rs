//! Heuristic choice between text-layer and page-image extraction.

/// Channel used to present the document to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// The extracted text layer is trustworthy; send it directly.
    Text,
    /// The text layer is too thin or unlabeled; send rendered page images.
    Vision,
}

/// Minimum trimmed length below which a text layer is considered unusable.
pub const MIN_TEXT_LEN: usize = 300;

/// Labels any legible ACORD 140 text layer should contain at least one of.
const REQUIRED_LABELS: [&str; 5] = ["ACORD", "Applicant", "Policy", "Carrier", "Agency"];

/// Decide the extraction channel for a document's text layer. Pure.
pub fn select_mode(text: &str) -> ExtractionMode {
    if text.trim().len() < MIN_TEXT_LEN {
        return ExtractionMode::Vision;
    }

    let lowered = text.to_lowercase();
    let label_found = REQUIRED_LABELS
        .iter()
        .any(|label| lowered.contains(&label.to_lowercase()));
    if !label_found {
        return ExtractionMode::Vision;
    }

    ExtractionMode::Text
}
