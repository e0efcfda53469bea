//! The single workflow state value
//!
//! Everything the live session knows lives here behind one async mutex. The
//! lock is taken to read or apply, never across a collaborator call.

use std::fmt;

use crate::extraction::ExtractionResult;
use crate::workflow::confidence::{annotate_fields, FieldAnnotation};
use crate::workflow::crosscheck::CompanyCheck;
use crate::workflow::dispatch::{DispatchController, DispatchPhase, PendingSend};
use crate::workflow::reconcile::{FieldReconciler, ReconcileOutcome, ReconciledFields, UploadVersion};

/// Why an orchestration made no collaborator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoExtraction,
    NoCompanyName,
    NoWebsite,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NoExtraction => "no certificate has been uploaded",
            SkipReason::NoCompanyName => "no company name was extracted",
            SkipReason::NoWebsite => "no official website has been resolved",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
    Skipped(SkipReason),
    /// A newer request of the same kind was issued while this one was in flight
    Superseded,
    Applied(T),
}

impl<T> RunOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            RunOutcome::Applied(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedExtraction {
    pub version: UploadVersion,
    pub result: ExtractionResult,
}

#[derive(Debug, Default)]
pub struct WorkflowState {
    pub extraction: Option<LoadedExtraction>,
    pub reconciler: FieldReconciler,
    pub company: CompanyCheck,
    pub dispatch: DispatchController,
    pub upload_error: Option<String>,
    next_version: u64,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly received extraction under a new upload version.
    ///
    /// Resets the company check and the dispatch gate, which both derive from
    /// the previous extraction.
    pub fn accept_extraction(&mut self, result: ExtractionResult) -> UploadVersion {
        self.next_version += 1;
        let version = UploadVersion(self.next_version);
        self.extraction = Some(LoadedExtraction { version, result });
        self.upload_error = None;
        self.company = CompanyCheck::NotStarted;
        self.dispatch.reset();
        self.dispatch.dismiss_feedback();
        self.sync_fields();
        version
    }

    /// Bring the reconciled fields in line with the current extraction
    pub fn sync_fields(&mut self) -> Option<ReconcileOutcome> {
        let loaded = self.extraction.as_ref()?;
        Some(self.reconciler.reconcile(loaded.version, &loaded.result))
    }

    pub fn current(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref().map(|loaded| &loaded.result)
    }

    pub fn current_version(&self) -> Option<UploadVersion> {
        self.extraction.as_ref().map(|loaded| loaded.version)
    }

    pub fn company_name(&self) -> Option<String> {
        self.current().and_then(ExtractionResult::company_name)
    }

    pub fn fields(&self) -> &ReconciledFields {
        self.reconciler.fields()
    }

    pub fn annotations(&self) -> Vec<FieldAnnotation> {
        annotate_fields(self.current(), self.fields())
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            extraction: self.extraction.clone(),
            fields: self.fields().clone(),
            annotations: self.annotations(),
            company: self.company.clone(),
            dispatch_phase: self.dispatch.phase(),
            pending_send: self.dispatch.pending().cloned(),
            dispatch_message: self.dispatch.status_message().map(str::to_string),
            upload_error: self.upload_error.clone(),
        }
    }
}

/// Owned copy of the workflow state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub extraction: Option<LoadedExtraction>,
    pub fields: ReconciledFields,
    pub annotations: Vec<FieldAnnotation>,
    pub company: CompanyCheck,
    pub dispatch_phase: DispatchPhase,
    pub pending_send: Option<PendingSend>,
    pub dispatch_message: Option<String>,
    pub upload_error: Option<String>,
}
