use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Collaborator service usage metrics
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    pub total_requests: AtomicU64,
    pub failures: AtomicU64,
    pub stale_discards: AtomicU64,
    pub cache_restores: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A response arrived after a newer request of the same kind was issued
    pub fn record_stale_discard(&self, operation: &str) {
        self.stale_discards.fetch_add(1, Ordering::Relaxed);
        debug!(operation, "Discarded superseded collaborator response");
    }

    pub fn record_cache_restore(&self) {
        self.cache_restores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ServiceStats {
        ServiceStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            stale_discards: self.stale_discards.load(Ordering::Relaxed),
            cache_restores: self.cache_restores.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Service metrics: requests={}, failures={}, stale_discards={}, cache_restores={}",
            stats.total_requests, stats.failures, stats.stale_discards, stats.cache_restores
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    pub total_requests: u64,
    pub failures: u64,
    pub stale_discards: u64,
    pub cache_restores: u64,
}

/// Global metrics instance
static SERVICE_METRICS: std::sync::LazyLock<ServiceMetrics> =
    std::sync::LazyLock::new(ServiceMetrics::new);

pub fn service_metrics() -> &'static ServiceMetrics {
    &SERVICE_METRICS
}

/// Create correlated spans for verification workflows
pub fn create_workflow_span(workflow: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow",
        workflow.name = workflow,
        correlation.id = correlation_id
    )
}

/// Time an operation and log its duration
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_accumulate() {
        let metrics = ServiceMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_failure();
        metrics.record_stale_discard("crosscheck_company");

        let stats = metrics.get_stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.stale_discards, 1);
        assert_eq!(stats.cache_restores, 0);
    }
}
