// Employment Verifier Library - certificate verification workflow coordination
// This exposes the core components for testing and integration

pub mod cache;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod fs;
pub mod history;
pub mod http;
pub mod observability;
pub mod services;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use cache::{CacheError, ResultCache};
pub use config::{config, init_config, VerifierConfig};
pub use extraction::{ConfidenceTag, ExtractionResult, TrackedField, UploadResponse};
pub use history::{HistoryManager, HistoryView, VerificationRecord, VerificationStatus};
pub use http::RateLimitedHttpClient;
pub use observability::{create_workflow_span, service_metrics, OperationTimer, ServiceMetrics};
pub use services::{HttpVerificationServices, ServiceError, VerificationServices};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflow::{
    CompanyCheck, ContactLookup, DispatchPhase, ReconciledFields, RunOutcome,
    VerificationCoordinator, WorkflowError,
};
