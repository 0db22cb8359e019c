//! Shared application state

use metrics_exporter_prometheus::PrometheusHandle;
use sentra_classifiers::{
    infer_batch_with, infer_one_with, load_with_device, validate_batch, LabelMap, ModelHandle,
};
use sentra_core::{BatchResult, Error, PredictionResult, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::ServiceConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServiceConfig>,

    /// Model loaded at startup; read-only from here on
    pub model: ModelHandle,

    /// Class index to sentiment label
    pub labels: Arc<LabelMap>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Load the model named by the configuration.
    ///
    /// Fails with an artifact load error if the model cannot be loaded; the
    /// service must not start serving in that case.
    pub fn new(config: ServiceConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        info!("Loading model from: {}", config.model_path.display());
        let model = load_with_device(&config.model_path, config.device)?;

        Ok(Self::with_model(config, model).with_metrics(metrics_handle))
    }

    /// Build state around an already loaded model
    pub fn with_model(config: ServiceConfig, model: ModelHandle) -> Self {
        let labels = Arc::new(config.labels.clone());
        Self {
            config: Arc::new(config),
            model,
            labels,
            metrics_handle: None,
        }
    }

    /// Attach a metrics handle
    pub fn with_metrics(mut self, metrics_handle: Option<PrometheusHandle>) -> Self {
        self.metrics_handle = metrics_handle;
        self
    }

    /// Score one text off the async runtime
    pub async fn predict_one(&self, text: String) -> Result<PredictionResult> {
        let state = self.clone();
        let result = self
            .run_blocking("predict", move || {
                infer_one_with(&state.model, &state.labels, &text, state.config.confidence)
            })
            .await?;

        metrics::counter!("sentra_texts_scored_total").increment(1);
        Ok(result)
    }

    /// Score a batch off the async runtime
    pub async fn predict_batch(&self, texts: Vec<String>) -> Result<BatchResult> {
        validate_batch(&texts, self.config.max_batch_size)?;
        if texts.is_empty() {
            return Ok(BatchResult::default());
        }

        let count = texts.len() as u64;
        let state = self.clone();
        let result = self
            .run_blocking("batch_predict", move || {
                infer_batch_with(&state.model, &state.labels, &texts, state.config.confidence)
            })
            .await?;

        metrics::counter!("sentra_texts_scored_total").increment(count);
        Ok(result)
    }

    async fn run_blocking<T, F>(&self, endpoint: &'static str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| Error::inference(format!("Inference task failed: {}", e)))?;

        metrics::histogram!("sentra_inference_latency_us", "endpoint" => endpoint)
            .record(start.elapsed().as_micros() as f64);
        result
    }
}
