//! Linear classifier heads evaluated with Candle

use crate::model_config::ClassifierConfig;
use crate::vectorizer::SparseRow;
use candle_core::{DType, Device, Tensor};
use sentra_core::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Fitted linear head: `probs = softmax(X · W + b)` over sparse feature rows
pub struct LinearHead {
    /// `[features, columns]`, stored pre-transposed so the batch is one matmul
    weights: Tensor,

    /// `[columns]`
    bias: Tensor,

    /// Single logistic column expanded to two classes
    binary: bool,

    num_features: usize,
    num_classes: usize,
    device: Device,
}

impl LinearHead {
    /// Build a head and move its weights onto `device`
    pub fn from_config(
        config: &ClassifierConfig,
        num_classes: usize,
        num_features: usize,
        device: &Device,
    ) -> Result<Self> {
        let (rows, bias, binary) = match config {
            ClassifierConfig::LogisticRegression { coef, intercept } => {
                let binary = coef.len() == 1 && num_classes == 2;
                if !binary && coef.len() != num_classes {
                    return Err(Error::artifact_load(format!(
                        "logistic_regression has {} coefficient rows for {} classes",
                        coef.len(),
                        num_classes
                    )));
                }
                (coef, intercept, binary)
            }
            ClassifierConfig::MultinomialNb {
                feature_log_prob,
                class_log_prior,
            } => {
                if feature_log_prob.len() != num_classes {
                    return Err(Error::artifact_load(format!(
                        "multinomial_nb has {} feature_log_prob rows for {} classes",
                        feature_log_prob.len(),
                        num_classes
                    )));
                }
                (feature_log_prob, class_log_prior, false)
            }
        };

        let columns = rows.len();
        if bias.len() != columns {
            return Err(Error::artifact_load(format!(
                "{} bias has {} entries, expected {}",
                config.kind(),
                bias.len(),
                columns
            )));
        }

        let mut transposed = vec![0f32; num_features * columns];
        for (c, row) in rows.iter().enumerate() {
            if row.len() != num_features {
                return Err(Error::artifact_load(format!(
                    "{} weight row {} has {} entries but the vectorizer produces {} features",
                    config.kind(),
                    c,
                    row.len(),
                    num_features
                )));
            }
            for (f, &w) in row.iter().enumerate() {
                transposed[f * columns + c] = w;
            }
        }

        let weights = Tensor::from_vec(transposed, (num_features, columns), device)
            .map_err(|e| Error::artifact_load(format!("Failed to place weights on device: {}", e)))?;
        let bias = Tensor::from_slice(bias, columns, device)
            .map_err(|e| Error::artifact_load(format!("Failed to place bias on device: {}", e)))?;

        Ok(Self {
            weights,
            bias,
            binary,
            num_features,
            num_classes,
            device: device.clone(),
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Class probabilities for a batch of sparse feature rows.
    ///
    /// Only the weight rows of columns active somewhere in the batch are
    /// gathered, so the dense block is `[rows, active]` rather than
    /// `[rows, num_features]`.
    pub fn probabilities(&self, batch: &[SparseRow]) -> Result<Vec<Vec<f32>>> {
        if let Some(column) = batch
            .iter()
            .flatten()
            .map(|(column, _)| *column)
            .find(|column| *column >= self.num_features)
        {
            return Err(Error::inference(format!(
                "Feature column {} is outside the model's {} features",
                column, self.num_features
            )));
        }

        self.forward(batch)
            .map_err(|e| Error::inference(format!("Model forward pass failed: {}", e)))
    }

    fn forward(&self, batch: &[SparseRow]) -> candle_core::Result<Vec<Vec<f32>>> {
        let rows = batch.len();
        let active: BTreeSet<usize> = batch.iter().flatten().map(|(column, _)| *column).collect();
        let width = self.weights.dim(1)?;

        let logits = if active.is_empty() {
            Tensor::zeros((rows, width), DType::F32, &self.device)?.broadcast_add(&self.bias)?
        } else {
            let position: HashMap<usize, usize> =
                active.iter().enumerate().map(|(i, &c)| (c, i)).collect();

            let mut block = vec![0f32; rows * active.len()];
            for (r, row) in batch.iter().enumerate() {
                for &(column, value) in row {
                    block[r * active.len() + position[&column]] = value;
                }
            }

            let ids: Vec<u32> = active.iter().map(|&c| c as u32).collect();
            let ids = Tensor::from_vec(ids, active.len(), &self.device)?;
            let weights = self.weights.index_select(&ids, 0)?;
            let x = Tensor::from_vec(block, (rows, active.len()), &self.device)?;
            x.matmul(&weights)?.broadcast_add(&self.bias)?
        };

        // softmax([0, z]) == [1 - sigmoid(z), sigmoid(z)]
        let logits = if self.binary {
            let zeros = Tensor::zeros((rows, 1), DType::F32, &self.device)?;
            Tensor::cat(&[&zeros, &logits], 1)?
        } else {
            logits
        };

        candle_nn::ops::softmax_last_dim(&logits)?.to_vec2::<f32>()
    }
}
