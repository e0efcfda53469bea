//! Verification workflow coordinator
//!
//! Facade over the workflow state and its orchestrators: upload, field edits,
//! company cross-check, contact discovery, the dispatch gate and report export.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn, Instrument};

use crate::cache::ResultCache;
use crate::extraction::{ExtractionResult, TrackedField};
use crate::observability::{create_workflow_span, service_metrics};
use crate::services::{ReportFormat, ServiceError, VerificationServices};
use crate::telemetry::generate_correlation_id;
use crate::workflow::confidence::FieldAnnotation;
use crate::workflow::contacts::{ContactLookup, ContactsOrchestrator};
use crate::workflow::crosscheck::{CompanyCheck, CrossCheckOrchestrator};
use crate::workflow::dispatch::{DispatchError, DispatchFeedback, PendingSend};
use crate::workflow::reconcile::{UploadVersion, ValidationError};
use crate::workflow::sequence::RequestSequencer;
use crate::workflow::state::{RunOutcome, WorkflowSnapshot, WorkflowState};

pub const UPLOAD_FAILED_MESSAGE: &str = "Error uploading file.";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Error uploading file.")]
    Upload(#[source] ServiceError),
    #[error("{0} is not among the discovered contacts")]
    UnknownContact(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("Failed to export report: {0}")]
    Export(#[source] ServiceError),
}

pub struct VerificationCoordinator {
    services: Arc<dyn VerificationServices>,
    cache: Option<ResultCache>,
    state: Arc<Mutex<WorkflowState>>,
    uploads: RequestSequencer,
    crosscheck: CrossCheckOrchestrator,
    contacts: ContactsOrchestrator,
}

impl VerificationCoordinator {
    pub fn new(services: Arc<dyn VerificationServices>, cache: Option<ResultCache>) -> Self {
        Self {
            crosscheck: CrossCheckOrchestrator::new(services.clone()),
            contacts: ContactsOrchestrator::new(services.clone()),
            services,
            cache,
            state: Arc::new(Mutex::new(WorkflowState::new())),
            uploads: RequestSequencer::new(),
        }
    }

    pub fn services(&self) -> Arc<dyn VerificationServices> {
        self.services.clone()
    }

    /// Seed the workflow from the last cached upload, if any
    pub async fn start(&self) -> Option<UploadVersion> {
        let cache = self.cache.as_ref()?;
        let restored = match cache.load().await {
            Ok(restored) => restored?,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached result");
                return None;
            }
        };

        service_metrics().record_cache_restore();
        let mut state = self.state.lock().await;
        if state.extraction.is_some() {
            return state.current_version();
        }
        Some(state.accept_extraction(restored))
    }

    /// Upload a certificate and install its extraction.
    ///
    /// On failure the previous extraction stays in place, the upload error is
    /// recorded for display and the cache slot is cleared.
    pub async fn upload_certificate(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<RunOutcome<UploadVersion>, WorkflowError> {
        let span = create_workflow_span("upload", &generate_correlation_id());
        async move {
            let ticket = self.uploads.issue();
            info!(file_name, bytes = contents.len(), "Uploading certificate");
            let result = self.services.upload_certificate(file_name, contents).await;

            let outcome = {
                let mut state = self.state.lock().await;
                if !self.uploads.is_current(ticket) {
                    service_metrics().record_stale_discard("upload");
                    return Ok(RunOutcome::Superseded);
                }

                match result {
                    Ok(response) => {
                        let extraction = ExtractionResult::from(response);
                        self.crosscheck.invalidate();
                        self.contacts.invalidate();
                        let version = state.accept_extraction(extraction.clone());
                        info!(
                            version = version.0,
                            suspicious = extraction.suspicious_features.len(),
                            "Extraction accepted"
                        );
                        Ok((version, extraction))
                    }
                    Err(e) => {
                        warn!(error = %e, "Certificate upload failed");
                        state.upload_error = Some(UPLOAD_FAILED_MESSAGE.to_string());
                        Err(e)
                    }
                }
            };

            // cache I/O happens outside the workflow lock
            match outcome {
                Ok((version, extraction)) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.save(&extraction).await {
                            warn!(error = %e, "Failed to cache extraction result");
                        }
                    }
                    Ok(RunOutcome::Applied(version))
                }
                Err(e) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.clear().await {
                            warn!(error = %e, "Failed to clear cached extraction result");
                        }
                    }
                    Err(WorkflowError::Upload(e))
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn edit_field(&self, field: TrackedField, value: &str) {
        self.state.lock().await.reconciler.edit(field, value);
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn annotations(&self) -> Vec<FieldAnnotation> {
        self.state.lock().await.annotations()
    }

    pub async fn cross_check(&self) -> RunOutcome<CompanyCheck> {
        self.contacts.invalidate();
        self.crosscheck.run(&self.state).await
    }

    pub async fn find_contacts(&self) -> RunOutcome<ContactLookup> {
        self.contacts.run(&self.state).await
    }

    /// Whether the discovered-contact action is enabled
    pub async fn contact_action_availability(&self) -> Result<(), ValidationError> {
        self.state.lock().await.fields().validate_for_contact_action()
    }

    /// Open the confirmation gate for one of the discovered emails
    pub async fn request_send(&self, to_email: &str) -> Result<PendingSend, WorkflowError> {
        let mut state = self.state.lock().await;
        let known = state
            .company
            .contacts()
            .and_then(ContactLookup::found)
            .is_some_and(|contacts| contacts.has_email(to_email));
        if !known {
            return Err(WorkflowError::UnknownContact(to_email.to_string()));
        }

        let fields = state.fields().clone();
        let extracted = state
            .current()
            .map(|result| result.extracted_fields.clone())
            .unwrap_or_default();
        Ok(state.dispatch.request(to_email, &fields, &extracted)?)
    }

    pub async fn cancel_send(&self) -> Result<(), WorkflowError> {
        Ok(self.state.lock().await.dispatch.cancel()?)
    }

    /// Confirm the pending send and submit it
    pub async fn confirm_send(&self) -> Result<DispatchFeedback, WorkflowError> {
        let request = self.state.lock().await.dispatch.confirm()?;

        let span = create_workflow_span("dispatch", &generate_correlation_id());
        let result = self
            .services
            .send_verification_email(&request)
            .instrument(span)
            .await;

        Ok(self.state.lock().await.dispatch.complete(result)?)
    }

    pub async fn dismiss_feedback(&self) {
        self.state.lock().await.dispatch.dismiss_feedback();
    }

    /// Render the current extraction as a report; `None` without an extraction
    pub async fn export_report(&self, format: ReportFormat) -> Result<Option<Vec<u8>>, WorkflowError> {
        let fields = {
            let state = self.state.lock().await;
            match state.current() {
                Some(result) => result.extracted_fields.clone(),
                None => return Ok(None),
            }
        };

        let bytes = self
            .services
            .export_report(format, &fields)
            .await
            .map_err(WorkflowError::Export)?;
        info!(format = %format, bytes = bytes.len(), "Report exported");
        Ok(Some(bytes))
    }
}
