//! Verification workflow
//!
//! Leaf-first: confidence annotation and field reconciliation, then the
//! company cross-check and contact discovery orchestrators, the dispatch gate,
//! and the coordinator that ties them to one workflow state.

pub mod confidence;
pub mod contacts;
pub mod coordinator;
pub mod crosscheck;
pub mod dispatch;
pub mod reconcile;
pub mod sequence;
pub mod state;

pub use confidence::{annotate, annotate_fields, BadgeColor, ConfidenceBadge, FieldAnnotation};
pub use contacts::{ContactLookup, ContactsOrchestrator, CONTACTS_FAILED_MESSAGE};
pub use coordinator::{VerificationCoordinator, WorkflowError, UPLOAD_FAILED_MESSAGE};
pub use crosscheck::{CompanyCheck, CrossCheckOrchestrator, NO_WEBSITE_MESSAGE};
pub use dispatch::{
    DispatchController, DispatchError, DispatchFeedback, DispatchPhase, PendingSend,
    SEND_SUCCESS_MESSAGE,
};
pub use reconcile::{
    FieldReconciler, ReconcileOutcome, ReconciledFields, UploadVersion, ValidationError,
};
pub use sequence::{RequestSequencer, RequestTicket};
pub use state::{LoadedExtraction, RunOutcome, SkipReason, WorkflowSnapshot, WorkflowState};
