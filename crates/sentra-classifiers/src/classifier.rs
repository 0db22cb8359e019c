//! Model capability trait and common types

use sentra_core::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Class index emitted by a model
pub type ClassIndex = u32;

/// Trait for every text classification model the service can host.
///
/// Implementations are shared across concurrent requests through `&self`, so
/// they must be safe to call from several threads at once. A model whose
/// backend is not must serialize access internally.
pub trait TextClassifier: Send + Sync {
    /// Predicted class index for each input, aligned by position
    fn classify(&self, texts: &[String]) -> Result<Vec<ClassIndex>>;

    /// Probability distribution over classes for each input, aligned by position
    fn class_probabilities(&self, texts: &[String]) -> Result<Vec<ClassDistribution>>;

    /// Predicted class and full distribution for each input.
    ///
    /// The default calls both capabilities over the same inputs and assumes
    /// they agree on the prediction. Models that compute both in one forward
    /// pass should override this.
    fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        let classes = self.classify(texts)?;
        let distributions = self.class_probabilities(texts)?;

        if classes.len() != texts.len() || distributions.len() != texts.len() {
            return Err(Error::inference(format!(
                "model '{}' returned {} predictions and {} distributions for {} inputs",
                self.name(),
                classes.len(),
                distributions.len(),
                texts.len()
            )));
        }

        Ok(classes
            .into_iter()
            .zip(distributions)
            .map(|(class, distribution)| Prediction {
                class,
                distribution,
            })
            .collect())
    }

    /// Get the model name
    fn name(&self) -> &str;
}

/// Per-input probability distribution over classes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDistribution {
    entries: Vec<(ClassIndex, f32)>,
}

impl ClassDistribution {
    /// Create a distribution from `(class, probability)` pairs
    pub fn new(entries: Vec<(ClassIndex, f32)>) -> Self {
        Self { entries }
    }

    /// Pair each class with the probability at the same position
    pub fn from_parts(classes: &[ClassIndex], probabilities: &[f32]) -> Self {
        Self {
            entries: classes
                .iter()
                .copied()
                .zip(probabilities.iter().copied())
                .collect(),
        }
    }

    /// Probability assigned to `class`, if the model emits it
    pub fn get(&self, class: ClassIndex) -> Option<f32> {
        self.entries
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, p)| *p)
    }

    /// Highest probability in the distribution.
    ///
    /// Returns NaN if any entry is NaN, so callers can reject it.
    pub fn max(&self) -> Option<f32> {
        self.entries
            .iter()
            .map(|(_, p)| *p)
            .reduce(|a, b| if a.is_nan() || b.is_nan() { f32::NAN } else { a.max(b) })
    }

    /// Class with the highest probability; the first one wins ties
    pub fn argmax(&self) -> Option<ClassIndex> {
        let mut best: Option<(ClassIndex, f32)> = None;
        for &(class, p) in &self.entries {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((class, p)),
            }
        }
        best.map(|(class, _)| class)
    }

    /// Sum of all probabilities
    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ClassIndex, f32)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Predicted class plus the distribution it was drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class: ClassIndex,
    pub distribution: ClassDistribution,
}

/// Process-wide, read-only handle to the loaded model.
///
/// Cloning is cheap; every clone refers to the same model instance.
#[derive(Clone)]
pub struct ModelHandle {
    inner: Arc<dyn TextClassifier>,
}

impl ModelHandle {
    /// Wrap a model
    pub fn new(model: impl TextClassifier + 'static) -> Self {
        Self {
            inner: Arc::new(model),
        }
    }

    /// Wrap an already shared model
    pub fn from_arc(model: Arc<dyn TextClassifier>) -> Self {
        Self { inner: model }
    }

    pub fn classify(&self, texts: &[String]) -> Result<Vec<ClassIndex>> {
        self.inner.classify(texts)
    }

    pub fn class_probabilities(&self, texts: &[String]) -> Result<Vec<ClassDistribution>> {
        self.inner.class_probabilities(texts)
    }

    pub fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        self.inner.predict(texts)
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_lookup() {
        let dist = ClassDistribution::from_parts(&[0, 1], &[0.25, 0.75]);

        assert_eq!(dist.get(1), Some(0.75));
        assert_eq!(dist.get(2), None);
        assert_eq!(dist.max(), Some(0.75));
        assert_eq!(dist.argmax(), Some(1));
        assert!((dist.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_argmax_ties_pick_first() {
        let dist = ClassDistribution::new(vec![(3, 0.4), (7, 0.4), (9, 0.2)]);
        assert_eq!(dist.argmax(), Some(3));
    }

    #[test]
    fn test_empty_distribution() {
        let dist = ClassDistribution::default();
        assert!(dist.is_empty());
        assert_eq!(dist.max(), None);
        assert_eq!(dist.argmax(), None);
    }

    #[test]
    fn test_max_propagates_nan() {
        let dist = ClassDistribution::new(vec![(0, f32::NAN), (1, 0.5)]);
        assert!(dist.max().unwrap().is_nan());
    }

    struct Mismatched;

    impl TextClassifier for Mismatched {
        fn classify(&self, texts: &[String]) -> Result<Vec<ClassIndex>> {
            Ok(vec![0; texts.len()])
        }

        fn class_probabilities(&self, _texts: &[String]) -> Result<Vec<ClassDistribution>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "mismatched"
        }
    }

    #[test]
    fn test_default_predict_rejects_misaligned_outputs() {
        let handle = ModelHandle::new(Mismatched);
        let err = handle.predict(&["a".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
}
