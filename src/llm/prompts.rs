//! Fixed instruction prompt for ACORD 140 extraction.
//!
//! The prompt embeds the exact target JSON skeleton and is identical across
//! calls and channels; text mode appends the document text after it.

pub const EXTRACTION_PROMPT: &str = r#"
You are an expert ACORD 140 form data extraction specialist.
Extract ALL fields from the ACORD 140 Property Section form.
You MUST extract every field even if empty.

IMPORTANT EXTRACTION RULES:
- Extract EXACT values
- Checkboxes -> true/false
- Empty -> ""
- Dates -> MM/DD/YYYY
- Never hallucinate values
- Return ONLY JSON
- Every field shown below MUST be present in the output JSON

RETURN JSON IN THIS EXACT STRUCTURE:

{
  "acordForm": "ACORD 140 (Property)",
  "generalInformation": {
    "date": "",
    "agencyCustomerId": "",
    "agencyName": "",
    "applicant": "",
    "policyNumber": "",
    "carrier": "",
    "naicCode": "",
    "effectiveDate": "",
    "expirationDate": "",
    "directBill": false,
    "agencyBill": false,
    "paymentPlan": "",
    "audit": ""
  },
  "construction": {
    "propertySection": {},
    "constructionRatings": []
  },
  "spoilageCoverage": {},
  "premisesInformation": [],
  "additionalInterests": [],
  "fraudNoticeSection": {}
}
"#;

/// Document-text suffix for the text channel, sent as its own part after
/// the prompt.
pub fn text_mode_input(text: &str) -> String {
    format!("\n\nDocument Content:\n{}", text)
}
