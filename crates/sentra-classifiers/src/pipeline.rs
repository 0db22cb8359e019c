//! Fitted text classification pipeline
//!
//! Feature extraction followed by a linear head. Each call vectorizes the
//! whole batch and scores it with a single forward pass, so one prediction
//! and its distribution always come from the same computation.

use crate::classifier::{ClassDistribution, ClassIndex, Prediction, TextClassifier};
use crate::linear::LinearHead;
use crate::model_config::PipelineArtifact;
use crate::vectorizer::TfidfVectorizer;
use candle_core::Device;
use sentra_core::{Error, Result};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

pub struct TextPipeline {
    name: String,
    classes: Vec<ClassIndex>,
    vectorizer: TfidfVectorizer,
    head: LinearHead,
}

impl TextPipeline {
    /// Assemble a pipeline from a parsed artifact
    pub fn from_artifact(artifact: PipelineArtifact, device: &Device) -> Result<Self> {
        let name = artifact.display_name("text-pipeline");

        if artifact.classes.len() < 2 {
            return Err(Error::artifact_load(format!(
                "Model '{}' must declare at least two classes, found {}",
                name,
                artifact.classes.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = artifact.classes.iter().find(|c| !seen.insert(**c)) {
            return Err(Error::artifact_load(format!(
                "Model '{}' declares class {} more than once",
                name, dup
            )));
        }

        let vectorizer = TfidfVectorizer::from_config(artifact.vectorizer)?;
        let head = LinearHead::from_config(
            &artifact.classifier,
            artifact.classes.len(),
            vectorizer.num_features(),
            device,
        )?;

        Ok(Self {
            name,
            classes: artifact.classes,
            vectorizer,
            head,
        })
    }

    /// Class index for each output column
    pub fn classes(&self) -> &[ClassIndex] {
        &self.classes
    }

    pub fn num_features(&self) -> usize {
        self.vectorizer.num_features()
    }

    pub fn device(&self) -> &Device {
        self.head.device()
    }
}

impl TextClassifier for TextPipeline {
    fn classify(&self, texts: &[String]) -> Result<Vec<ClassIndex>> {
        Ok(self.predict(texts)?.into_iter().map(|p| p.class).collect())
    }

    fn class_probabilities(&self, texts: &[String]) -> Result<Vec<ClassDistribution>> {
        Ok(self
            .predict(texts)?
            .into_iter()
            .map(|p| p.distribution)
            .collect())
    }

    fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let features = self.vectorizer.transform(texts);
        let rows = self.head.probabilities(&features)?;

        if rows.len() != texts.len() {
            return Err(Error::inference(format!(
                "Forward pass returned {} rows for {} inputs",
                rows.len(),
                texts.len()
            )));
        }

        let predictions = rows
            .iter()
            .map(|probs| {
                let distribution = ClassDistribution::from_parts(&self.classes, probs);
                let class = distribution.argmax().ok_or_else(|| {
                    Error::inference("Forward pass returned an empty probability row")
                })?;
                Ok(Prediction {
                    class,
                    distribution,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            model = %self.name,
            batch_size = texts.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Scored batch"
        );

        Ok(predictions)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
