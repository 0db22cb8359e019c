//! Single-text and batch sentiment inference
//!
//! Both paths make exactly one model call per request: a batch is scored by
//! one batched invocation, never by looping over the single-text path.

use crate::classifier::{ModelHandle, Prediction};
use crate::labels::LabelMap;
use sentra_core::{BatchResult, Error, PredictionResult, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which probability is reported as the confidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePolicy {
    /// Highest probability in the distribution
    #[default]
    MaxProbability,
    /// Probability of the predicted class
    PredictedClass,
}

impl ConfidencePolicy {
    /// Raw (unrounded) confidence for a prediction
    pub fn confidence(self, prediction: &Prediction) -> Result<f64> {
        let value = match self {
            Self::MaxProbability => {
                let max = prediction.distribution.max().ok_or_else(|| {
                    Error::inference("Model returned an empty class distribution")
                })?;
                if let Some(predicted) = prediction.distribution.get(prediction.class) {
                    if predicted < max {
                        warn!(
                            class = prediction.class,
                            predicted_probability = predicted,
                            max_probability = max,
                            "Predicted class is not the most probable one"
                        );
                    }
                }
                max
            }
            Self::PredictedClass => prediction
                .distribution
                .get(prediction.class)
                .ok_or_else(|| {
                    Error::inference(format!(
                        "Predicted class {} is missing from its probability distribution",
                        prediction.class
                    ))
                })?,
        };

        if !value.is_finite() {
            return Err(Error::inference(format!(
                "Model produced a non-finite probability ({})",
                value
            )));
        }

        Ok(f64::from(value))
    }
}

/// Reject a batch before it reaches the model
pub fn validate_batch(texts: &[String], max_batch_size: Option<usize>) -> Result<()> {
    match max_batch_size {
        Some(max) if texts.len() > max => Err(Error::validation(format!(
            "Batch of {} texts exceeds the maximum of {}",
            texts.len(),
            max
        ))),
        _ => Ok(()),
    }
}

/// Score one text with the default confidence policy
pub fn infer_one(handle: &ModelHandle, labels: &LabelMap, text: &str) -> Result<PredictionResult> {
    infer_one_with(handle, labels, text, ConfidencePolicy::default())
}

/// Score one text
pub fn infer_one_with(
    handle: &ModelHandle,
    labels: &LabelMap,
    text: &str,
    policy: ConfidencePolicy,
) -> Result<PredictionResult> {
    let texts = [text.to_string()];
    let predictions = handle.predict(&texts).map_err(into_inference)?;

    let prediction = match predictions.as_slice() {
        [prediction] => prediction,
        other => {
            return Err(Error::inference(format!(
                "Model '{}' returned {} predictions for one input",
                handle.name(),
                other.len()
            )))
        }
    };

    shape(text, prediction, labels, policy)
}

/// Score a batch with the default confidence policy
pub fn infer_batch(handle: &ModelHandle, labels: &LabelMap, texts: &[String]) -> Result<BatchResult> {
    infer_batch_with(handle, labels, texts, ConfidencePolicy::default())
}

/// Score a batch; result `i` always belongs to `texts[i]`.
///
/// The batch succeeds or fails as a whole.
pub fn infer_batch_with(
    handle: &ModelHandle,
    labels: &LabelMap,
    texts: &[String],
    policy: ConfidencePolicy,
) -> Result<BatchResult> {
    if texts.is_empty() {
        return Ok(BatchResult::default());
    }

    let predictions = handle.predict(texts).map_err(into_inference)?;
    if predictions.len() != texts.len() {
        return Err(Error::inference(format!(
            "Model '{}' returned {} predictions for {} inputs",
            handle.name(),
            predictions.len(),
            texts.len()
        )));
    }

    let results = texts
        .iter()
        .zip(&predictions)
        .map(|(text, prediction)| shape(text, prediction, labels, policy))
        .collect::<Result<Vec<_>>>()?;

    debug!(batch_size = results.len(), model = handle.name(), "Batch inference complete");
    Ok(BatchResult::new(results))
}

fn shape(
    text: &str,
    prediction: &Prediction,
    labels: &LabelMap,
    policy: ConfidencePolicy,
) -> Result<PredictionResult> {
    let confidence = policy.confidence(prediction)?;
    let sentiment = labels.resolve(prediction.class);
    Ok(PredictionResult::new(text, sentiment, confidence))
}

/// Any failure raised by the model is reported as an inference failure
fn into_inference(err: Error) -> Error {
    match err {
        Error::Inference(_) => err,
        other => Error::inference(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassDistribution;

    fn prediction(class: u32, probs: &[(u32, f32)]) -> Prediction {
        Prediction {
            class,
            distribution: ClassDistribution::new(probs.to_vec()),
        }
    }

    #[test]
    fn test_max_probability_policy() {
        let p = prediction(1, &[(0, 0.07), (1, 0.93)]);
        let c = ConfidencePolicy::MaxProbability.confidence(&p).unwrap();
        assert!((c - 0.93).abs() < 1e-6);
    }

    #[test]
    fn test_policies_diverge_when_prediction_is_not_argmax() {
        let p = prediction(0, &[(0, 0.4), (1, 0.6)]);

        let max = ConfidencePolicy::MaxProbability.confidence(&p).unwrap();
        let predicted = ConfidencePolicy::PredictedClass.confidence(&p).unwrap();
        assert!((max - 0.6).abs() < 1e-6);
        assert!((predicted - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_predicted_class_missing_from_distribution() {
        let p = prediction(2, &[(0, 0.5), (1, 0.5)]);
        let err = ConfidencePolicy::PredictedClass.confidence(&p).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_non_finite_and_empty_distributions() {
        let nan = prediction(0, &[(0, f32::NAN), (1, 0.5)]);
        assert!(ConfidencePolicy::MaxProbability.confidence(&nan).is_err());

        let empty = prediction(0, &[]);
        assert!(ConfidencePolicy::MaxProbability.confidence(&empty).is_err());
    }

    #[test]
    fn test_validate_batch() {
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(validate_batch(&texts, None).is_ok());
        assert!(validate_batch(&texts, Some(3)).is_ok());
        assert!(matches!(
            validate_batch(&texts, Some(2)),
            Err(Error::Validation(_))
        ));
        assert!(validate_batch(&[], Some(0)).is_ok());
    }

    #[test]
    fn test_policy_serde() {
        let policy: ConfidencePolicy = serde_yaml::from_str("predicted_class").unwrap();
        assert_eq!(policy, ConfidencePolicy::PredictedClass);
    }
}
