use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process metrics.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Sign-in metrics
    pub sign_in_requests: IntCounterVec,
    pub refresh_failures: IntCounterVec,
    pub refresh_duration: HistogramVec,

    // Cache metrics
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub token_expiry_unix: IntGauge,
    pub expiry_fallbacks: IntCounter,

    // Config/runtime
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("signin".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Sign-in
            sign_in_requests: IntCounterVec::new(Opts::new("sign_in_requests_total", "Sign-in requests by response status class"),&["status"],).unwrap(),
            refresh_failures: IntCounterVec::new(Opts::new("refresh_failures_total", "Failed token refreshes by reason"),&["reason"],).unwrap(),
            refresh_duration: HistogramVec::new(HistogramOpts::new("refresh_duration_seconds", "Token refresh duration seconds, retries included").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),&["outcome"],).unwrap(),

            // Cache
            cache_hits: IntCounter::new("cache_hits_total", "Token requests served from cache").unwrap(),
            cache_misses: IntCounter::new("cache_misses_total", "Token requests that required a refresh").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry timestamp of the cached token").unwrap(),
            expiry_fallbacks: IntCounter::new("expiry_fallbacks_total", "Tokens cached with the default ttl because expiry was malformed").unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.sign_in_requests.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_failures.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_duration.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.cache_misses.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.expiry_fallbacks.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();

        metrics
    }

    /// Render all metrics in the prometheus text exposition format.
    pub fn gather_text(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::get_metrics;

    #[tokio::test]
    async fn text_exposition_contains_prefixed_names() {
        let metrics = get_metrics().await;
        metrics.cache_hits.inc();
        metrics.sign_in_requests.with_label_values(&["2xx"]).inc();

        let text = metrics.gather_text().unwrap();
        assert!(text.contains("signin_cache_hits_total"));
        assert!(text.contains("signin_sign_in_requests_total{status=\"2xx\"}"));
    }
}
