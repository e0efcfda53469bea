//! Verification history
//!
//! Records live in the verification store; this manager only fetches them and
//! pushes status updates. The list is never patched locally: every successful
//! update is followed by a full re-fetch.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::{ServiceError, StatusUpdate, VerificationServices};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch verifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Sent,
    Confirmed,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Sent => "sent",
            VerificationStatus::Confirmed => "confirmed",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "sent" => Ok(VerificationStatus::Sent),
            "confirmed" => Ok(VerificationStatus::Confirmed),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(format!(
                "Unknown status '{other}' (use pending, sent, confirmed or rejected)"
            )),
        }
    }
}

/// A dispatched verification request as persisted by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: u64,
    pub to_email: String,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub id_no: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    pub status: VerificationStatus,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub hr_reply: Option<String>,
}

impl VerificationRecord {
    pub fn sent_at_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.sent_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    /// `YYYY-MM-DD HH:MM:SS`, or the raw value trimmed to that shape
    pub fn sent_at_display(&self) -> String {
        match self.sent_at_timestamp() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self
                .sent_at
                .as_deref()
                .map(|raw| raw.replace('T', " ").chars().take(19).collect())
                .unwrap_or_default(),
        }
    }
}

/// What the history list should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Records(&'a [VerificationRecord]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No status chosen, nothing sent
    Skipped,
    Updated,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to fetch verifications: {0}")]
    Fetch(#[source] ServiceError),
    #[error("Failed to update status: {0}")]
    Update(#[source] ServiceError),
}

pub struct HistoryManager {
    services: Arc<dyn VerificationServices>,
    records: Vec<VerificationRecord>,
    error: Option<String>,
    loaded: bool,
}

impl HistoryManager {
    pub fn new(services: Arc<dyn VerificationServices>) -> Self {
        Self {
            services,
            records: Vec::new(),
            error: None,
            loaded: false,
        }
    }

    /// Fetch the full list from the store.
    ///
    /// On failure the previously fetched records are kept and the view
    /// switches to the error state.
    pub async fn refresh(&mut self) -> Result<&[VerificationRecord], HistoryError> {
        match self.services.list_verifications().await {
            Ok(records) => {
                info!(count = records.len(), "Fetched verification history");
                self.records = records;
                self.error = None;
                self.loaded = true;
                Ok(&self.records)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch verification history");
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
                self.loaded = true;
                Err(HistoryError::Fetch(e))
            }
        }
    }

    pub fn view(&self) -> HistoryView<'_> {
        if let Some(error) = &self.error {
            return HistoryView::Error(error);
        }
        if !self.loaded {
            HistoryView::Loading
        } else if self.records.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Records(&self.records)
        }
    }

    pub fn records(&self) -> &[VerificationRecord] {
        &self.records
    }

    pub fn record(&self, id: u64) -> Option<&VerificationRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Push a status change for one record, then re-fetch the list
    pub async fn update_status(
        &mut self,
        id: u64,
        status: Option<VerificationStatus>,
        hr_reply: &str,
    ) -> Result<UpdateOutcome, HistoryError> {
        let Some(status) = status else {
            return Ok(UpdateOutcome::Skipped);
        };

        let update = StatusUpdate {
            id,
            status,
            hr_reply: hr_reply.to_string(),
        };
        self.services
            .update_verification_status(&update)
            .await
            .map_err(HistoryError::Update)?;
        info!(id, status = %status, "Verification status updated");

        if let Err(e) = self.refresh().await {
            warn!(id, error = %e, "Status updated but history re-fetch failed");
        }
        Ok(UpdateOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockVerificationServices;
    use mockall::predicate::*;

    fn record(id: u64, status: VerificationStatus) -> VerificationRecord {
        VerificationRecord {
            id,
            to_email: "hr@acme.com".to_string(),
            employee_name: Some("Jane Doe".to_string()),
            id_no: None,
            department: Some("Eng".to_string()),
            status,
            sent_at: Some("2026-03-01T09:30:15.123456".to_string()),
            hr_reply: None,
        }
    }

    fn transport_error() -> ServiceError {
        ServiceError::Transport {
            operation: "verifications",
            message: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_list_and_fetch_error_are_distinct() {
        let mut services = MockVerificationServices::new();
        services
            .expect_list_verifications()
            .times(1)
            .returning(|| Ok(Vec::new()));
        let mut manager = HistoryManager::new(Arc::new(services));
        assert_eq!(manager.view(), HistoryView::Loading);

        manager.refresh().await.unwrap();
        assert_eq!(manager.view(), HistoryView::Empty);

        let mut failing = MockVerificationServices::new();
        failing
            .expect_list_verifications()
            .times(1)
            .returning(|| Err(transport_error()));
        let mut manager = HistoryManager::new(Arc::new(failing));
        assert!(manager.refresh().await.is_err());
        assert_eq!(manager.view(), HistoryView::Error(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_records() {
        let mut services = MockVerificationServices::new();
        let mut calls = 0;
        services.expect_list_verifications().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![record(1, VerificationStatus::Sent)])
            } else {
                Err(transport_error())
            }
        });
        let mut manager = HistoryManager::new(Arc::new(services));

        manager.refresh().await.unwrap();
        assert!(manager.refresh().await.is_err());
        assert_eq!(manager.records().len(), 1);
    }

    #[tokio::test]
    async fn update_without_status_issues_no_request() {
        let mut services = MockVerificationServices::new();
        services
            .expect_list_verifications()
            .times(1)
            .returning(|| Ok(vec![record(7, VerificationStatus::Sent)]));
        services.expect_update_verification_status().never();
        let mut manager = HistoryManager::new(Arc::new(services));
        manager.refresh().await.unwrap();

        let outcome = manager.update_status(7, None, "ignored").await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Skipped);
        assert_eq!(manager.records(), &[record(7, VerificationStatus::Sent)]);
    }

    #[tokio::test]
    async fn successful_update_refetches_list() {
        let mut services = MockVerificationServices::new();
        services
            .expect_update_verification_status()
            .with(eq(StatusUpdate {
                id: 7,
                status: VerificationStatus::Confirmed,
                hr_reply: "Employment confirmed".to_string(),
            }))
            .times(1)
            .returning(|_| Ok(()));
        services
            .expect_list_verifications()
            .times(1)
            .returning(|| Ok(vec![record(7, VerificationStatus::Confirmed)]));
        let mut manager = HistoryManager::new(Arc::new(services));

        let outcome = manager
            .update_status(7, Some(VerificationStatus::Confirmed), "Employment confirmed")
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated);
        assert_eq!(manager.record(7).map(|r| r.status), Some(VerificationStatus::Confirmed));
    }

    #[tokio::test]
    async fn failed_update_leaves_list_untouched() {
        let mut services = MockVerificationServices::new();
        services
            .expect_update_verification_status()
            .times(1)
            .returning(|_| Err(transport_error()));
        services.expect_list_verifications().never();
        let mut manager = HistoryManager::new(Arc::new(services));

        let result = manager
            .update_status(3, Some(VerificationStatus::Rejected), "")
            .await;
        assert!(matches!(result, Err(HistoryError::Update(_))));
        assert_eq!(manager.view(), HistoryView::Loading);
    }

    #[test]
    fn sent_at_renders_without_fraction() {
        assert_eq!(record(1, VerificationStatus::Sent).sent_at_display(), "2026-03-01 09:30:15");

        let mut odd = record(2, VerificationStatus::Pending);
        odd.sent_at = Some("yesterday".to_string());
        assert_eq!(odd.sent_at_display(), "yesterday");
    }
}
