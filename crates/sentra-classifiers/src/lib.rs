//! Sentra Classifiers
//!
//! Loading and serving of fitted text classification models.
//!
//! - [`model_loader::load`] reads a pipeline artifact once and returns a
//!   shared [`ModelHandle`]
//! - [`inference::infer_one`] / [`inference::infer_batch`] score text through
//!   the handle and shape the results
//! - [`labels::resolve`] turns class indices into sentiment labels
//!
//! Scoring runs on Candle; a batch is one matrix product.

pub mod classifier;
pub mod inference;
pub mod labels;
pub mod linear;
pub mod model_config;
pub mod model_loader;
pub mod pipeline;
pub mod vectorizer;

pub use classifier::{ClassDistribution, ClassIndex, ModelHandle, Prediction, TextClassifier};
pub use inference::{
    infer_batch, infer_batch_with, infer_one, infer_one_with, validate_batch, ConfidencePolicy,
};
pub use labels::{resolve, LabelMap};
pub use model_config::{ArtifactFormat, ClassifierConfig, NormKind, PipelineArtifact, VectorizerConfig};
pub use model_loader::{load, load_with_device, DeviceType};
pub use pipeline::TextPipeline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassDistribution, ModelHandle, Prediction, TextClassifier};
    pub use crate::inference::{infer_batch, infer_one, ConfidencePolicy};
    pub use crate::labels::LabelMap;
    pub use crate::model_loader::{load, DeviceType};
}
