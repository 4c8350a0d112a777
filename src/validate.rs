//! Multi-tier validation of a normalized extraction record.
//!
//! Required-field violations are hard errors; consistency and construction
//! issues are soft warnings. Validation never fails: it always returns a
//! structured report, even for a completely blank record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Acord140Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Fail,
    PassWithWarnings,
    Pass,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub overall_status: OverallStatus,
}

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%m/%d/%y"];

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Check a date string against the accepted ACORD formats. Returns an error
/// message on failure, distinguishing empty from malformed.
fn validate_date(date: &Option<String>, field_name: &str) -> Option<String> {
    let raw = date.as_deref().unwrap_or("");
    if raw.trim().is_empty() {
        return Some(format!("{} is empty", field_name));
    }

    for format in DATE_FORMATS {
        if NaiveDate::parse_from_str(raw, format).is_ok() {
            return None;
        }
    }

    Some(format!("{} has invalid date format: {}", field_name, raw))
}

/// Errors: the ten required generalInformation fields plus date formats.
pub fn validate_required_fields(record: &Acord140Record) -> Vec<String> {
    let gi = &record.general_information;
    let mut errors = Vec::new();

    let required: [(&str, &Option<String>); 10] = [
        ("agencyCustomerId", &gi.agency_customer_id),
        ("agencyName", &gi.agency_name),
        ("applicant", &gi.applicant),
        ("policyNumber", &gi.policy_number),
        ("carrier", &gi.carrier),
        ("naicCode", &gi.naic_code),
        ("effectiveDate", &gi.effective_date),
        ("expirationDate", &gi.expiration_date),
        ("paymentPlan", &gi.payment_plan),
        ("audit", &gi.audit),
    ];

    for (field, value) in required {
        if blank(value) {
            errors.push(format!("Required field '{}' is missing", field));
        }
    }

    for (field, value) in [
        ("effectiveDate", &gi.effective_date),
        ("expirationDate", &gi.expiration_date),
    ] {
        if let Some(message) = validate_date(value, field) {
            errors.push(message);
        }
    }

    errors
}

/// Warnings: cross-field checks on billing flags, dates, identifiers and
/// spoilage entries.
pub fn validate_consistency(record: &Acord140Record) -> Vec<String> {
    let gi = &record.general_information;
    let mut warnings = Vec::new();

    let direct = gi.direct_bill.unwrap_or(false);
    let agency = gi.agency_bill.unwrap_or(false);
    if direct && agency {
        warnings.push(
            "Both directBill and agencyBill are selected - only one is expected.".to_string(),
        );
    }
    if !direct && !agency {
        warnings.push(
            "Neither directBill nor agencyBill is selected - one should be selected.".to_string(),
        );
    }

    // Best effort: skipped silently when either date fails to parse.
    let eff = gi
        .effective_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%m/%d/%Y").ok());
    let exp = gi
        .expiration_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%m/%d/%Y").ok());
    if let (Some(eff), Some(exp)) = (eff, exp) {
        if exp <= eff {
            warnings.push("expirationDate should be after effectiveDate.".to_string());
        }
    }

    if let Some(naic) = gi.naic_code.as_deref() {
        if !naic.is_empty() && !naic.chars().all(|c| c.is_ascii_digit()) {
            warnings.push(format!("naicCode '{}' is not numeric.", naic));
        }
    }

    if let Some(policy) = gi.policy_number.as_deref() {
        if !policy.is_empty() && policy.chars().count() < 4 {
            warnings.push("policyNumber appears too short.".to_string());
        }
    }

    for (idx, entry) in record.spoilage_coverage.iter().enumerate() {
        if !matches!(entry.spoilage_coverage_yn, Value::Bool(_) | Value::Null) {
            warnings.push(format!(
                "Spoilage coverage entry {} has invalid Y/N flag.",
                idx
            ));
        }
    }

    warnings
}

/// Warnings: property-section presence and the wiring/wiringYear pair per
/// rating entry. Only the wiring pair is cross-checked; the other
/// improvement/year pairs are not.
pub fn validate_construction(record: &Acord140Record) -> Vec<String> {
    let mut warnings = Vec::new();

    let property_section = record.construction.get("propertySection");
    if !property_section.map_or(false, truthy) {
        warnings.push("construction.propertySection is empty.".to_string());
    }

    let ratings = record
        .construction
        .get("constructionRatings")
        .and_then(Value::as_array);
    for (idx, rating) in ratings.into_iter().flatten().enumerate() {
        let improvements = rating.get("buildingImprovements");
        let wiring = improvements
            .and_then(|bi| bi.get("wiring"))
            .map_or(false, truthy);
        let wiring_year = improvements
            .and_then(|bi| bi.get("wiringYear"))
            .map_or(false, truthy);
        if wiring && !wiring_year {
            warnings.push(format!(
                "constructionRatings[{}]: wiringYear missing despite wiring=true",
                idx
            ));
        }
    }

    warnings
}

/// Run all three passes and derive the overall status.
pub fn full_validation(record: &Acord140Record) -> ValidationReport {
    let errors = validate_required_fields(record);

    let mut warnings = validate_consistency(record);
    warnings.extend(validate_construction(record));

    let overall_status = if !errors.is_empty() {
        OverallStatus::Fail
    } else if !warnings.is_empty() {
        OverallStatus::PassWithWarnings
    } else {
        OverallStatus::Pass
    };

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        overall_status,
    }
}
