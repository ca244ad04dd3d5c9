use crate::services::repository::UserRepository;
use opentelemetry::{KeyValue, global, metrics::Histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const STORAGE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
struct HealthMetrics {
    health_check_duration_seconds: Histogram<f64>,
}

impl HealthMetrics {
    fn new() -> Self {
        let meter = global::meter("roster-server");
        Self {
            health_check_duration_seconds: meter
                .f64_histogram("health_check_duration_seconds")
                .with_description("Duration of health checks")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    repo: Arc<dyn UserRepository>,
    metrics: HealthMetrics,
}

impl HealthService {
    #[must_use]
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, metrics: HealthMetrics::new() }
    }

    /// Checks that the user store answers within the probe timeout.
    ///
    /// # Errors
    /// Returns a description of the failure if the store is unreachable or slow.
    pub async fn check_storage(&self) -> Result<(), String> {
        let start = Instant::now();

        let res = match timeout(STORAGE_TIMEOUT, self.repo.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Storage check failed: {e}")),
            Err(_) => Err("Storage check timed out".to_string()),
        };

        self.metrics
            .health_check_duration_seconds
            .record(start.elapsed().as_secs_f64(), &[KeyValue::new("component", "database")]);
        res
    }
}
