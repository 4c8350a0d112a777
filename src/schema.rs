//! Canonical record shape for an ACORD 140 (Property) extraction result.
//!
//! The schema is permissive-additive: a strongly-typed core carries the
//! fields the validator inspects, and flattened side-channel maps preserve
//! every unknown key the model emits. Construction never rejects extra data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AcordExtractError, Result};

pub const ACORD_FORM_TYPE: &str = "ACORD 140 (Property)";

fn default_form_type() -> String {
    ACORD_FORM_TYPE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInformation {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub agency_customer_id: Option<String>,
    #[serde(default)]
    pub agency_name: Option<String>,
    #[serde(default)]
    pub applicant: Option<String>,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub naic_code: Option<String>,
    #[serde(default)]
    pub effective_date: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub direct_bill: Option<bool>,
    #[serde(default)]
    pub agency_bill: Option<bool>,
    #[serde(default)]
    pub payment_plan: Option<String>,
    #[serde(default)]
    pub audit: Option<String>,

    /// Keys the form variant does not name. Preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpoilageCoverage {
    /// Kept loose on purpose: the validator warns on anything that is not a
    /// boolean or null instead of rejecting the record.
    #[serde(default, rename = "spoilageCoverageYN")]
    pub spoilage_coverage_yn: Value,
    #[serde(default)]
    pub limit: Value,
    #[serde(default)]
    pub deductible: Value,
    #[serde(default)]
    pub options: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Acord140Record {
    #[serde(default = "default_form_type")]
    pub acord_form: String,

    #[serde(default)]
    pub general_information: GeneralInformation,

    /// Open nested record. The normalizer guarantees `propertySection` and
    /// `constructionRatings` keys before construction.
    #[serde(default, deserialize_with = "cleaned_open_record")]
    pub construction: Map<String, Value>,

    /// Models return either a bare record or a list here; both collapse to a
    /// list of zero or more entries.
    #[serde(default, deserialize_with = "record_or_list")]
    pub spoilage_coverage: Vec<SpoilageCoverage>,

    #[serde(default)]
    pub premises_information: Vec<Map<String, Value>>,

    #[serde(default)]
    pub additional_interests: Vec<Map<String, Value>>,

    #[serde(default, deserialize_with = "cleaned_open_record")]
    pub fraud_notice_section: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Acord140Record {
    fn default() -> Self {
        Self {
            acord_form: default_form_type(),
            general_information: GeneralInformation::default(),
            construction: Map::new(),
            spoilage_coverage: Vec::new(),
            premises_information: Vec::new(),
            additional_interests: Vec::new(),
            fraud_notice_section: Map::new(),
            extra: Map::new(),
        }
    }
}

impl Acord140Record {
    /// Build a record from an already-normalized JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(AcordExtractError::SchemaConstruction)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Accept a bare record or a sequence of records; anything else becomes an
/// empty sequence.
fn record_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<SpoilageCoverage>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => {
            let entry = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            Ok(vec![entry])
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// Open record whose top-level empty-string values collapse to null.
fn cleaned_open_record<'de, D>(
    deserializer: D,
) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, val)| {
                let val = match val {
                    Value::String(s) if s.is_empty() => Value::Null,
                    other => other,
                };
                (key, val)
            })
            .collect()),
        Value::Null => Ok(Map::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_empty_object() {
        let record = Acord140Record::from_value(json!({})).unwrap();
        assert_eq!(record.acord_form, ACORD_FORM_TYPE);
        assert!(record.spoilage_coverage.is_empty());
        assert!(record.construction.is_empty());
    }

    #[test]
    fn test_spoilage_bare_record_becomes_single_entry() {
        let record = Acord140Record::from_value(json!({
            "spoilageCoverage": {"spoilageCoverageYN": true, "limit": "25000"}
        }))
        .unwrap();
        assert_eq!(record.spoilage_coverage.len(), 1);
        assert_eq!(record.spoilage_coverage[0].spoilage_coverage_yn, json!(true));
        assert_eq!(record.spoilage_coverage[0].limit, json!("25000"));
    }

    #[test]
    fn test_spoilage_list_passes_through() {
        let record = Acord140Record::from_value(json!({
            "spoilageCoverage": [
                {"spoilageCoverageYN": false},
                {"spoilageCoverageYN": null, "options": "refrigerated goods"}
            ]
        }))
        .unwrap();
        assert_eq!(record.spoilage_coverage.len(), 2);
        assert_eq!(
            record.spoilage_coverage[1].options.as_deref(),
            Some("refrigerated goods")
        );
    }

    #[test]
    fn test_spoilage_scalar_becomes_empty_list() {
        let record =
            Acord140Record::from_value(json!({"spoilageCoverage": "yes"})).unwrap();
        assert!(record.spoilage_coverage.is_empty());
    }

    #[test]
    fn test_fraud_notice_empty_strings_collapse_to_null() {
        let record = Acord140Record::from_value(json!({
            "fraudNoticeSection": {"noticeText": "", "state": "NY"}
        }))
        .unwrap();
        assert_eq!(record.fraud_notice_section["noticeText"], Value::Null);
        assert_eq!(record.fraud_notice_section["state"], json!("NY"));
    }

    #[test]
    fn test_extra_keys_preserved_through_round_trip() {
        let record = Acord140Record::from_value(json!({
            "generalInformation": {"applicant": "ACME", "underwriterNotes": "see file"},
            "someVendorField": 42
        }))
        .unwrap();
        assert_eq!(
            record.general_information.extra["underwriterNotes"],
            json!("see file")
        );
        assert_eq!(record.extra["someVendorField"], json!(42));

        let value = record.to_value().unwrap();
        assert_eq!(value["someVendorField"], json!(42));
        assert_eq!(value["generalInformation"]["underwriterNotes"], json!("see file"));
    }

    #[test]
    fn test_null_scalars_tolerated() {
        let record = Acord140Record::from_value(json!({
            "generalInformation": {"applicant": null, "directBill": null}
        }))
        .unwrap();
        assert_eq!(record.general_information.applicant, None);
        assert_eq!(record.general_information.direct_bill, None);
    }
}
