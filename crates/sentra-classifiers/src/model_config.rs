//! Pipeline artifact structures
//!
//! A pipeline artifact is a fitted feature transform plus a linear classifier
//! head, stored as JSON or YAML. Nothing in here is trained; the numbers come
//! straight from whatever fitted the model.

use crate::classifier::ClassIndex;
use sentra_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Serialized, already-fitted classification pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    /// Model name
    #[serde(default)]
    pub name: Option<String>,

    /// Class index emitted for each output column, in column order
    pub classes: Vec<ClassIndex>,

    /// Feature extraction settings
    pub vectorizer: VectorizerConfig,

    /// Classifier head weights
    pub classifier: ClassifierConfig,
}

/// Fitted term-frequency / inverse-document-frequency vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Term to feature column
    pub vocabulary: HashMap<String, usize>,

    /// Inverse document frequency per column; absent means raw counts
    #[serde(default)]
    pub idf: Option<Vec<f32>>,

    /// Lowercase text before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Token regex; the first capture group is used when present
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    /// Inclusive (min, max) n-gram sizes
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Tokens dropped before n-grams are built
    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Clip term counts to 1
    #[serde(default)]
    pub binary: bool,

    /// Replace tf with 1 + ln(tf)
    #[serde(default)]
    pub sublinear_tf: bool,

    /// Row normalization
    #[serde(default)]
    pub norm: NormKind,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    r"\b\w\w+\b".to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Feature row normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormKind {
    L1,
    #[default]
    L2,
    None,
}

/// Linear classifier head
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierConfig {
    /// Logistic regression.
    ///
    /// `coef` is `[classes, features]` with a softmax over classes, or a
    /// single row for a binary model scored with the logistic function.
    LogisticRegression {
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
    },

    /// Multinomial naive Bayes
    MultinomialNb {
        feature_log_prob: Vec<Vec<f32>>,
        class_log_prior: Vec<f32>,
    },
}

impl ClassifierConfig {
    /// Human-readable head type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression { .. } => "logistic_regression",
            Self::MultinomialNb { .. } => "multinomial_nb",
        }
    }
}

/// Artifact serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
}

impl ArtifactFormat {
    /// Guess the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

impl PipelineArtifact {
    /// Read an artifact from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact_load(format!("Failed to read artifact {}: {}", path.display(), e))
        })?;

        Self::parse(&contents, ArtifactFormat::from_path(path))
            .map_err(|e| Error::artifact_load(format!("{}: {}", path.display(), e)))
    }

    /// Parse an artifact from a string
    pub fn parse(contents: &str, format: ArtifactFormat) -> Result<Self> {
        match format {
            ArtifactFormat::Json => serde_json::from_str(contents)
                .map_err(|e| Error::artifact_load(format!("Invalid JSON artifact: {}", e))),
            ArtifactFormat::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| Error::artifact_load(format!("Invalid YAML artifact: {}", e))),
        }
    }

    /// Name to report for this model, falling back to `default`
    pub fn display_name(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_string())
    }
}
