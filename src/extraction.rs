//! Extraction result model
//!
//! Normalized view of one upload response from the extraction service. The
//! service nests its confidence map and OCR warning inside `extracted_fields`;
//! they are lifted out here while the raw field map is kept intact, because the
//! dispatch and export payloads forward it verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Key of the per-field confidence map inside `extracted_fields`
pub const CONFIDENCE_KEY: &str = "_confidence";
/// Key of the OCR quality warning inside `extracted_fields`
pub const OCR_WARNING_KEY: &str = "ocr_warning";
/// Key of the issuing company's name inside `extracted_fields`
pub const COMPANY_NAME_KEY: &str = "company_name";

/// The four user-editable fields tracked through reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    EmployeeName,
    IdNo,
    Department,
    Designation,
}

impl TrackedField {
    pub const ALL: [TrackedField; 4] = [
        TrackedField::EmployeeName,
        TrackedField::IdNo,
        TrackedField::Department,
        TrackedField::Designation,
    ];

    /// Wire key used by the extraction and dispatch services
    pub fn key(self) -> &'static str {
        match self {
            TrackedField::EmployeeName => "employee_name",
            TrackedField::IdNo => "id_no",
            TrackedField::Department => "department",
            TrackedField::Designation => "designation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackedField::EmployeeName => "Employee Name",
            TrackedField::IdNo => "Employee ID No",
            TrackedField::Department => "Department",
            TrackedField::Designation => "Designation",
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field '{0}' (expected one of: employee_name, id_no, department, designation)")]
pub struct UnknownFieldError(pub String);

impl FromStr for TrackedField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "employee_name" | "name" => Ok(TrackedField::EmployeeName),
            "id_no" | "id" => Ok(TrackedField::IdNo),
            "department" | "dept" => Ok(TrackedField::Department),
            "designation" | "title" => Ok(TrackedField::Designation),
            _ => Err(UnknownFieldError(s.to_string())),
        }
    }
}

/// Provenance of an extracted value
///
/// The extraction service reports `AI` for model-extracted values and `regex`
/// for pattern matches. Anything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConfidenceTag {
    Ai,
    Pattern,
    Other(String),
}

impl From<String> for ConfidenceTag {
    fn from(value: String) -> Self {
        match value.as_str() {
            "AI" => ConfidenceTag::Ai,
            "regex" | "pattern" => ConfidenceTag::Pattern,
            _ => ConfidenceTag::Other(value),
        }
    }
}

impl From<ConfidenceTag> for String {
    fn from(tag: ConfidenceTag) -> Self {
        match tag {
            ConfidenceTag::Ai => "AI".to_string(),
            ConfidenceTag::Pattern => "regex".to_string(),
            ConfidenceTag::Other(other) => other,
        }
    }
}

/// One upload's extraction, immutable once received
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub extracted_fields: Map<String, Value>,
    #[serde(default)]
    pub confidence: BTreeMap<String, ConfidenceTag>,
    #[serde(default)]
    pub suspicious_features: Vec<String>,
    #[serde(default)]
    pub ocr_warning: Option<String>,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Text value of an extracted field, `None` when absent, null or structured
    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.extracted_fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn tracked_value(&self, field: TrackedField) -> String {
        self.field_text(field.key()).unwrap_or_default()
    }

    pub fn confidence_for(&self, field: TrackedField) -> Option<&ConfidenceTag> {
        self.confidence.get(field.key())
    }

    /// Company name to cross-check, only when non-empty
    pub fn company_name(&self) -> Option<String> {
        self.field_text(COMPANY_NAME_KEY)
            .filter(|name| !name.trim().is_empty())
    }

    pub fn has_suspicious_features(&self) -> bool {
        !self.suspicious_features.is_empty()
    }
}

/// Upload response as returned by `POST /upload`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub extracted_fields: Option<Map<String, Value>>,
    #[serde(default)]
    pub suspicious_features: Option<Vec<String>>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<UploadResponse> for ExtractionResult {
    fn from(response: UploadResponse) -> Self {
        let extracted_fields = response.extracted_fields.unwrap_or_default();

        let confidence = match extracted_fields.get(CONFIDENCE_KEY) {
            Some(Value::Object(tags)) => tags
                .iter()
                .filter_map(|(field, tag)| {
                    tag.as_str()
                        .map(|tag| (field.clone(), ConfidenceTag::from(tag.to_string())))
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        let ocr_warning = extracted_fields
            .get(OCR_WARNING_KEY)
            .and_then(Value::as_str)
            .filter(|warning| !warning.is_empty())
            .map(str::to_string);

        Self {
            extracted_fields,
            confidence,
            suspicious_features: response.suspicious_features.unwrap_or_default(),
            ocr_warning,
            raw_text: response.raw_text.unwrap_or_default(),
            error: response.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> ExtractionResult {
        let response: UploadResponse = serde_json::from_value(value).unwrap();
        ExtractionResult::from(response)
    }

    #[test]
    fn lifts_confidence_and_ocr_warning_out_of_fields() {
        let result = decode(json!({
            "extracted_fields": {
                "employee_name": "Jane Doe",
                "department": "Eng",
                "_confidence": {"employee_name": "AI", "department": "regex", "designation": 3},
                "ocr_warning": "Low resolution scan"
            },
            "suspicious_features": ["Mismatched fonts"],
            "raw_text": "CERTIFICATE"
        }));

        assert_eq!(result.confidence_for(TrackedField::EmployeeName), Some(&ConfidenceTag::Ai));
        assert_eq!(result.confidence_for(TrackedField::Department), Some(&ConfidenceTag::Pattern));
        assert_eq!(result.confidence_for(TrackedField::Designation), None);
        assert_eq!(result.ocr_warning.as_deref(), Some("Low resolution scan"));
        assert_eq!(result.suspicious_features, vec!["Mismatched fonts".to_string()]);
        // the raw map is forwarded untouched
        assert!(result.extracted_fields.contains_key(CONFIDENCE_KEY));
    }

    #[test]
    fn tolerates_nulls_and_missing_sections() {
        let result = decode(json!({
            "extracted_fields": {"employee_name": null, "id_no": 4711, "ocr_warning": null},
            "suspicious_features": null,
            "error": "OCR failed on page 2"
        }));

        assert_eq!(result.tracked_value(TrackedField::EmployeeName), "");
        assert_eq!(result.tracked_value(TrackedField::IdNo), "4711");
        assert!(result.ocr_warning.is_none());
        assert!(result.suspicious_features.is_empty());
        assert_eq!(result.raw_text, "");
        assert_eq!(result.error.as_deref(), Some("OCR failed on page 2"));
    }

    #[test]
    fn blank_company_name_is_not_cross_checkable() {
        let result = decode(json!({"extracted_fields": {"company_name": "  "}}));
        assert_eq!(result.company_name(), None);

        let result = decode(json!({"extracted_fields": {"company_name": "Acme"}}));
        assert_eq!(result.company_name().as_deref(), Some("Acme"));
    }

    #[test]
    fn confidence_tag_keeps_wire_spelling() {
        let tag: ConfidenceTag = serde_json::from_value(json!("regex")).unwrap();
        assert_eq!(tag, ConfidenceTag::Pattern);
        assert_eq!(serde_json::to_value(&tag).unwrap(), json!("regex"));

        let other: ConfidenceTag = serde_json::from_value(json!("manual")).unwrap();
        assert_eq!(other, ConfidenceTag::Other("manual".to_string()));
    }

    #[test]
    fn tracked_field_parses_short_names() {
        assert_eq!("name".parse::<TrackedField>().unwrap(), TrackedField::EmployeeName);
        assert_eq!("ID-NO".parse::<TrackedField>().unwrap(), TrackedField::IdNo);
        assert!("salary".parse::<TrackedField>().is_err());
    }
}
