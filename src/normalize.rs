//! Deterministic repair of raw model output into the canonical shape.
//!
//! Every operation here is a deep setdefault: a key is written only when it
//! is absent. Present keys are never overwritten, even when their value is
//! null, so running the normalizer twice yields the same result as once.
//! Keys present with an unrecognized type pass through unchanged; the record
//! layer tolerates them via its open typing.

use serde_json::{json, Map, Value};

/// Repair a decoded model reply in place so it satisfies every structural
/// invariant the record constructor expects.
pub fn normalize_response(data: &mut Value) {
    let Some(obj) = data.as_object_mut() else {
        return;
    };

    fill_defaults(
        obj,
        json!({
            "generalInformation": {},
            "construction": {},
            "spoilageCoverage": [],
            "premisesInformation": [],
            "additionalInterests": [],
            "fraudNoticeSection": {}
        }),
    );

    if let Some(general) = obj.get_mut("generalInformation").and_then(Value::as_object_mut) {
        normalize_general_information(general);
    }

    if let Some(construction) = obj.get_mut("construction").and_then(Value::as_object_mut) {
        normalize_construction(construction);
    }
}

fn normalize_general_information(general: &mut Map<String, Value>) {
    fill_defaults(
        general,
        json!({
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
        }),
    );

    // Checkbox fields often come back as "yes"/"checked"/"1" strings.
    for field in ["directBill", "agencyBill"] {
        if let Some(Value::String(s)) = general.get(field) {
            let truthy = matches!(
                s.to_lowercase().as_str(),
                "true" | "yes" | "checked" | "1"
            );
            general.insert(field.to_string(), Value::Bool(truthy));
        }
    }

    // audit is free text; models sometimes answer it as a checkbox.
    if let Some(Value::Bool(flag)) = general.get("audit") {
        let text = if *flag { "yes" } else { "no" };
        general.insert("audit".to_string(), Value::String(text.to_string()));
    }
}

fn normalize_construction(construction: &mut Map<String, Value>) {
    fill_defaults(
        construction,
        json!({
            "propertySection": {},
            "constructionRatings": []
        }),
    );

    if let Some(prop) = construction
        .get_mut("propertySection")
        .and_then(Value::as_object_mut)
    {
        fill_defaults(prop, property_section_defaults());

        if let Some(alarm) = prop.get_mut("burglarAlarm").and_then(Value::as_object_mut) {
            fill_defaults(alarm, burglar_alarm_defaults());
        }
        if let Some(alarm) = prop.get_mut("fireAlarm").and_then(Value::as_object_mut) {
            fill_defaults(alarm, fire_alarm_defaults());
        }
    }

    if let Some(ratings) = construction
        .get_mut("constructionRatings")
        .and_then(Value::as_array_mut)
    {
        for rating in ratings {
            let Some(rating) = rating.as_object_mut() else {
                continue;
            };
            normalize_construction_rating(rating);
        }
    }
}

/// Entries may arrive with heterogeneous key sets; after this pass every
/// entry carries the full set.
fn normalize_construction_rating(rating: &mut Map<String, Value>) {
    fill_defaults(
        rating,
        json!({
            "buildingImprovements": {},
            "exposures": {},
            "premisesConstructionDetails": {}
        }),
    );

    if let Some(improvements) = rating
        .get_mut("buildingImprovements")
        .and_then(Value::as_object_mut)
    {
        fill_defaults(improvements, building_improvements_defaults());
    }

    if let Some(exposures) = rating.get_mut("exposures").and_then(Value::as_object_mut) {
        fill_defaults(
            exposures,
            json!({
                "rightExposureAndDistance": "",
                "leftExposureAndDistance": "",
                "frontExposureAndDistance": "",
                "rearExposureAndDistance": ""
            }),
        );
    }

    if let Some(details) = rating
        .get_mut("premisesConstructionDetails")
        .and_then(Value::as_object_mut)
    {
        fill_defaults(details, premises_construction_defaults());
    }
}

/// Insert each default only when the key is absent.
fn fill_defaults(map: &mut Map<String, Value>, defaults: Value) {
    if let Value::Object(defaults) = defaults {
        for (key, value) in defaults {
            map.entry(key).or_insert(value);
        }
    }
}

fn property_section_defaults() -> Value {
    json!({
        "propertySectionDate": "",
        "clockHourly": false,
        "guardsWatchmenCount": "",
        "wiringYear": "",
        "roofingYear": "",
        "plumbingYear": "",
        "heatingYear": "",
        "sprinklerPercent": "",
        "heatingBoilerOnPremises": false,
        "insurancePlacedElsewhereIfBoiler": "",
        "premisesFireProtection": "",
        "burglarAlarm": {},
        "fireAlarm": {}
    })
}

fn burglar_alarm_defaults() -> Value {
    json!({
        "installedAndServicedBy": "",
        "withKeys": false,
        "centralStation": false,
        "grade": "",
        "extent": "",
        "expirationDate": "",
        "certificateNumber": "",
        "type": ""
    })
}

fn fire_alarm_defaults() -> Value {
    json!({
        "manufacturer": "",
        "centralStation": false,
        "localGong": false
    })
}

fn building_improvements_defaults() -> Value {
    json!({
        "wiring": false,
        "wiringYear": "",
        "roofing": false,
        "roofingYear": "",
        "plumbing": false,
        "plumbingYear": "",
        "heating": false,
        "heatingYear": "",
        "otherImprovements": false,
        "otherImprovementsDescription": "",
        "otherImprovementsYear": ""
    })
}

fn premises_construction_defaults() -> Value {
    json!({
        "windClass": "",
        "resistive": false,
        "semiResistive": false,
        "buildingCode": "",
        "grade": "",
        "taxCode": "",
        "roofType": "",
        "otherOccupancies": "",
        "totalArea": "",
        "yearBuilt": "",
        "basementsCount": "",
        "storiesCount": "",
        "protectionClass": "",
        "fireDistrictCodeNumber": "",
        "milesToFireStation": "",
        "hydrantDistanceFeet": "",
        "constructionType": "",
        "fireStation": "",
        "hydrantDistanceTo": "",
        "blanket": "",
        "guardPercent": "",
        "inflation": "",
        "causesOfLoss": "",
        "coinsPercent": "",
        "additionalInformation": "",
        "frontExposureAndDistance": "",
        "rearExposureAndDistance": "",
        "leftExposureAndDistance": "",
        "rightExposureAndDistance": "",
        "premisesFireProtection": "",
        "heatingBoilerOnPremises": "",
        "insurancePlacedElsewhereIfBoiler": ""
    })
}
