use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::observability::{service_metrics, OperationTimer};
use crate::services::ServiceError;

/// Rate-limited JSON-over-HTTP client for the collaborator services
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: String,
}

impl RateLimitedHttpClient {
    /// Create a new rate-limited HTTP client
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let per_second = NonZeroU32::new(config.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.rate_limit.burst_capacity).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let mut builder = reqwest::Client::builder();
        // no timeout unless configured
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(|e| ServiceError::Transport {
            operation: "build_client",
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            rate_limiter,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Get current rate limiter status for monitoring
    pub fn rate_limiter_status(&self) -> String {
        match self.rate_limiter.check() {
            Ok(()) => "Rate limiter active".to_string(),
            Err(_) => "Rate limiter saturated".to_string(),
        }
    }

    async fn wait_turn(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ServiceError> {
        self.wait_turn().await;
        service_metrics().record_request();
        let timer = OperationTimer::new(operation);

        debug!(operation, "Sending collaborator request");
        let result = request.send().await;
        timer.finish();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                service_metrics().record_failure();
                warn!(operation, error = %e, "Collaborator request failed");
                return Err(ServiceError::from_reqwest(operation, e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            service_metrics().record_failure();
            let body = response.text().await.unwrap_or_default();
            warn!(operation, status = status.as_u16(), "Collaborator returned an error status");
            return Err(ServiceError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<R: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<R, ServiceError> {
        response.json::<R>().await.map_err(|e| {
            service_metrics().record_failure();
            ServiceError::Decode {
                operation,
                message: e.to_string(),
            }
        })
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<R, ServiceError> {
        let response = self.execute(operation, self.client.get(self.url(path))).await?;
        Self::decode(operation, response).await
    }

    pub async fn post_json<B, R>(&self, operation: &'static str, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.execute(operation, request).await?;
        Self::decode(operation, response).await
    }

    /// POST a JSON body where only the status of the reply matters
    pub async fn post_json_ack<B>(&self, operation: &'static str, path: &str, body: &B) -> Result<(), ServiceError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(operation, request).await.map(|_| ())
    }

    /// POST a JSON body and return the raw response body
    pub async fn post_json_for_bytes<B>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Vec<u8>, ServiceError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)).query(query).json(body);
        let response = self.execute(operation, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::from_reqwest(operation, e))?;
        Ok(bytes.to_vec())
    }

    pub async fn post_multipart<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        form: Form,
    ) -> Result<R, ServiceError> {
        let request = self.client.post(self.url(path)).multipart(form);
        let response = self.execute(operation, request).await?;
        Self::decode(operation, response).await
    }
}
