//! Wire payloads for Sentra
//!
//! Requests are parsed into [`TextInput`] / [`BatchInput`] by the transport
//! layer; results leave as [`PredictionResult`] (flat object) or
//! [`BatchResult`] (wrapped list).

use serde::{Deserialize, Serialize};

/// Number of decimal places kept on every reported confidence
pub const CONFIDENCE_DECIMALS: i32 = 4;

/// Round a probability to [`CONFIDENCE_DECIMALS`] places.
///
/// Values are clamped into `[0, 1]` first. Rounding is half away from zero
/// (`f64::round`), so `0.12345` becomes `0.1235` and `0.99995` becomes `1.0`.
pub fn round_confidence(value: f64) -> f64 {
    let scale = 10f64.powi(CONFIDENCE_DECIMALS);
    (value.clamp(0.0, 1.0) * scale).round() / scale
}

/// Single-text scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    /// Text to score; empty strings are passed to the model as-is
    pub text: String,
}

/// Batch scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchInput {
    /// Texts to score, in the order results must come back
    pub texts: Vec<String>,
}

/// Scored text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Echo of the input text
    pub text: String,

    /// Resolved sentiment label
    pub sentiment: String,

    /// Probability in `[0, 1]`, rounded to four decimal places
    pub confidence: f64,
}

impl PredictionResult {
    /// Shape a result, applying the confidence rounding rule
    pub fn new(text: impl Into<String>, sentiment: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            sentiment: sentiment.into(),
            confidence: round_confidence(confidence),
        }
    }
}

/// Ordered batch of results, same length and order as the request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<PredictionResult>,
}

impl BatchResult {
    pub fn new(results: Vec<PredictionResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl From<Vec<PredictionResult>> for BatchResult {
    fn from(results: Vec<PredictionResult>) -> Self {
        Self::new(results)
    }
}

/// Health check payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}
