//! Collaborator service abstractions
//!
//! The extraction, cross-check, contact-discovery, email-dispatch and
//! verification-record services are reached only through
//! [`VerificationServices`], so workflow code can be exercised against mocks.

pub mod errors;
pub mod http;
pub mod types;

use async_trait::async_trait;
use serde_json::{Map, Value};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::extraction::UploadResponse;
use crate::history::VerificationRecord;

pub use errors::ServiceError;
pub use http::HttpVerificationServices;
pub use types::{
    Contacts, CrossCheckResult, ReportFormat, SendVerificationRequest, SendVerificationResponse,
    StatusUpdate,
};

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait VerificationServices: Send + Sync {
    /// Submit a certificate image/PDF for extraction
    async fn upload_certificate(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadResponse, ServiceError>;

    /// Resolve a company name to its official website
    async fn crosscheck_company(&self, company_name: &str) -> Result<CrossCheckResult, ServiceError>;

    /// Discover HR contact points on a company website
    async fn company_contacts(&self, website: &str) -> Result<Contacts, ServiceError>;

    async fn send_verification_email(
        &self,
        request: &SendVerificationRequest,
    ) -> Result<SendVerificationResponse, ServiceError>;

    /// Render extracted fields as a downloadable report
    async fn export_report(
        &self,
        format: ReportFormat,
        fields: &Map<String, Value>,
    ) -> Result<Vec<u8>, ServiceError>;

    async fn list_verifications(&self) -> Result<Vec<VerificationRecord>, ServiceError>;

    async fn update_verification_status(&self, update: &StatusUpdate) -> Result<(), ServiceError>;
}
