//! Request/response bodies of the collaborator services

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::history::{VerificationRecord, VerificationStatus};

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each record on its own; a malformed record is logged and skipped
fn skip_malformed_records<'de, D>(deserializer: D) -> Result<Vec<VerificationRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = null_as_default(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<VerificationRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed verification record");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossCheckRequest {
    pub company_name: String,
}

/// Response of `POST /crosscheck_company`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrossCheckResult {
    #[serde(default)]
    pub official_website: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactsRequest {
    pub website: String,
}

/// Response of `POST /get_company_contacts`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contacts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phones: Vec<String>,
}

impl Contacts {
    pub fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|candidate| candidate == email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendVerificationRequest {
    pub to_email: String,
    pub fields: Map<String, Value>,
}

/// Response of `POST /send_verification_email`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendVerificationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        }
    }

    /// File name the report is saved under by default
    pub fn file_name(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "verification_report.pdf",
            ReportFormat::Csv => "verification_report.csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("Unsupported report format '{other}' (use pdf or csv)")),
        }
    }
}

/// Response of `GET /verifications`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VerificationsResponse {
    #[serde(default, deserialize_with = "skip_malformed_records")]
    pub verifications: Vec<VerificationRecord>,
}

/// Body of `POST /update_verification_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub id: u64,
    pub status: VerificationStatus,
    pub hr_reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contacts_tolerate_null_lists() {
        let contacts: Contacts =
            serde_json::from_value(json!({"emails": null, "phones": ["+1 555 0100"]})).unwrap();
        assert!(contacts.emails.is_empty());
        assert_eq!(contacts.phones, vec!["+1 555 0100".to_string()]);
    }

    #[test]
    fn send_response_without_success_flag_is_failure() {
        let response: SendVerificationResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!response.success);
    }

    #[test]
    fn malformed_verification_records_are_skipped() {
        let response: VerificationsResponse = serde_json::from_value(json!({
            "verifications": [
                {"id": 1, "to_email": "hr@acme.com", "status": "sent"},
                {"id": 2, "to_email": "hr@globex.com", "status": null},
                {"id": "three", "to_email": "hr@initech.com", "status": "pending"},
                {"id": 4, "to_email": "hr@umbrella.com", "status": "confirmed", "hr_reply": "ok"}
            ]
        }))
        .unwrap();

        let ids: Vec<u64> = response.verifications.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn null_verification_list_is_empty() {
        let response: VerificationsResponse =
            serde_json::from_value(json!({"verifications": null})).unwrap();
        assert!(response.verifications.is_empty());
    }

    #[test]
    fn report_format_parses_case_insensitively() {
        assert_eq!("PDF".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert!("docx".parse::<ReportFormat>().is_err());
    }
}
