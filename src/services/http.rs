//! HTTP implementation of the collaborator services

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use super::types::{ContactsRequest, CrossCheckRequest, VerificationsResponse};
use super::{
    Contacts, CrossCheckResult, ReportFormat, SendVerificationRequest, SendVerificationResponse,
    ServiceError, StatusUpdate, VerificationServices,
};
use crate::config::ServiceConfig;
use crate::extraction::UploadResponse;
use crate::history::VerificationRecord;
use crate::http::RateLimitedHttpClient;

pub struct HttpVerificationServices {
    client: RateLimitedHttpClient,
}

impl HttpVerificationServices {
    pub fn new(client: RateLimitedHttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Ok(Self::new(RateLimitedHttpClient::new(config)?))
    }
}

#[async_trait]
impl VerificationServices for HttpVerificationServices {
    async fn upload_certificate(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadResponse, ServiceError> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.client.post_multipart("upload", "/upload", form).await
    }

    async fn crosscheck_company(&self, company_name: &str) -> Result<CrossCheckResult, ServiceError> {
        let body = CrossCheckRequest {
            company_name: company_name.to_string(),
        };
        self.client
            .post_json("crosscheck_company", "/crosscheck_company", &body)
            .await
    }

    async fn company_contacts(&self, website: &str) -> Result<Contacts, ServiceError> {
        let body = ContactsRequest {
            website: website.to_string(),
        };
        self.client
            .post_json("get_company_contacts", "/get_company_contacts", &body)
            .await
    }

    async fn send_verification_email(
        &self,
        request: &SendVerificationRequest,
    ) -> Result<SendVerificationResponse, ServiceError> {
        self.client
            .post_json("send_verification_email", "/send_verification_email", request)
            .await
    }

    async fn export_report(
        &self,
        format: ReportFormat,
        fields: &Map<String, Value>,
    ) -> Result<Vec<u8>, ServiceError> {
        self.client
            .post_json_for_bytes("export_report", "/export_report", &[("format", format.as_str())], fields)
            .await
    }

    async fn list_verifications(&self) -> Result<Vec<VerificationRecord>, ServiceError> {
        let response: VerificationsResponse = self.client.get_json("verifications", "/verifications").await?;
        Ok(response.verifications)
    }

    async fn update_verification_status(&self, update: &StatusUpdate) -> Result<(), ServiceError> {
        self.client
            .post_json_ack("update_verification_status", "/update_verification_status", update)
            .await
    }
}
