//! The last-upload cache survives a restart

use employment_verifier::extraction::{ExtractionResult, UploadResponse};
use employment_verifier::fs::StandardFileSystem;
use employment_verifier::history::VerificationRecord;
use employment_verifier::config::VerifierConfig;
use employment_verifier::services::{HttpVerificationServices, VerificationServices};
use employment_verifier::workflow::VerificationCoordinator;
use employment_verifier::ResultCache;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn cache_at(path: &Path) -> ResultCache {
    ResultCache::new(Arc::new(StandardFileSystem), path.to_path_buf())
}

/// Real client that the cache paths never reach
fn idle_services() -> Arc<dyn VerificationServices> {
    Arc::new(HttpVerificationServices::from_config(&VerifierConfig::default().service).unwrap())
}

fn acme() -> ExtractionResult {
    let response: UploadResponse = serde_json::from_value(json!({
        "extracted_fields": {
            "employee_name": "Jane Doe",
            "department": "Eng",
            "_confidence": {"employee_name": "AI"}
        },
        "suspicious_features": ["Edited signature"],
        "raw_text": "..."
    }))
    .unwrap();
    response.into()
}

#[tokio::test]
async fn cached_result_seeds_a_fresh_coordinator() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/last.json");
    cache_at(&path).save(&acme()).await.unwrap();

    let services = idle_services();
    let coordinator = VerificationCoordinator::new(services, Some(cache_at(&path)));
    assert!(coordinator.start().await.is_some());

    let snapshot = coordinator.snapshot().await;
    let restored = snapshot.extraction.unwrap().result;
    assert_eq!(restored, acme());
    assert_eq!(snapshot.fields.employee_name, "Jane Doe");
    assert_eq!(snapshot.annotations[0].badge.label, "AI extracted");
}

#[tokio::test]
async fn empty_slot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let services = idle_services();
    let coordinator =
        VerificationCoordinator::new(services, Some(cache_at(&dir.path().join("last.json"))));

    assert!(coordinator.start().await.is_none());
    assert!(coordinator.snapshot().await.extraction.is_none());
}

#[tokio::test]
async fn clear_removes_the_slot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last.json");
    let cache = cache_at(&path);
    cache.save(&acme()).await.unwrap();

    cache.clear().await.unwrap();
    assert!(cache.load().await.unwrap().is_none());
    // clearing twice is fine
    cache.clear().await.unwrap();
}

#[test]
fn verification_record_tolerates_missing_optionals() {
    let record: VerificationRecord = serde_json::from_value(json!({
        "id": 9,
        "to_email": "hr@acme.com",
        "status": "pending"
    }))
    .unwrap();
    assert_eq!(record.sent_at_display(), "");
    assert!(record.hr_reply.is_none());
}
