//! Model artifact loading
//!
//! [`load`] runs once at process start; the returned [`ModelHandle`] is then
//! shared read-only by every request.

use crate::classifier::{ModelHandle, TextClassifier};
use crate::model_config::PipelineArtifact;
use crate::pipeline::TextPipeline;
use candle_core::Device;
use sentra_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::info;

/// Device type for inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize), // GPU index
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl DeviceType {
    /// Create the Candle device
    pub fn create(self) -> Result<Device> {
        match self {
            Self::Cpu => Ok(Device::Cpu),
            Self::Cuda(idx) => Device::new_cuda(idx).map_err(|e| {
                Error::artifact_load(format!("Failed to create CUDA device {}: {}", idx, e))
            }),
            Self::Metal(idx) => Device::new_metal(idx).map_err(|e| {
                Error::artifact_load(format!("Failed to create Metal device {}: {}", idx, e))
            }),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(idx) => write!(f, "cuda:{}", idx),
            Self::Metal(idx) => write!(f, "metal:{}", idx),
        }
    }
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, index) = match s.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .parse()
                    .map_err(|_| Error::config(format!("Invalid device index in '{}'", s)))?;
                (kind, index)
            }
            None => (s, 0),
        };

        match kind.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            _ => Err(Error::config(format!("Unknown device '{}'", s))),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(device: DeviceType) -> Self {
        device.to_string()
    }
}

/// Load a pipeline artifact onto the CPU
pub fn load(path: impl AsRef<Path>) -> Result<ModelHandle> {
    load_with_device(path, DeviceType::Cpu)
}

/// Load a pipeline artifact onto the given device
pub fn load_with_device(path: impl AsRef<Path>, device: DeviceType) -> Result<ModelHandle> {
    let path = path.as_ref();
    let start = Instant::now();

    if !path.is_file() {
        return Err(Error::artifact_load(format!(
            "Model file not found: {}",
            path.display()
        )));
    }

    let artifact = PipelineArtifact::from_file(path)?;
    let default_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let artifact = PipelineArtifact {
        name: Some(artifact.display_name(default_name)),
        ..artifact
    };

    let device = device.create()?;
    let pipeline = TextPipeline::from_artifact(artifact, &device)?;

    info!(
        "Loaded model '{}' from {} ({} classes, {} features, {:?}) in {}ms",
        pipeline.name(),
        path.display(),
        pipeline.classes().len(),
        pipeline.num_features(),
        pipeline.device(),
        start.elapsed().as_millis()
    );

    Ok(ModelHandle::new(pipeline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_parsing() {
        assert_eq!("cpu".parse::<DeviceType>().unwrap(), DeviceType::Cpu);
        assert_eq!("cuda:1".parse::<DeviceType>().unwrap(), DeviceType::Cuda(1));
        assert_eq!("mps".parse::<DeviceType>().unwrap(), DeviceType::Metal(0));
        assert!("tpu".parse::<DeviceType>().is_err());
        assert!("cuda:x".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_device_type_serde() {
        let device: DeviceType = serde_yaml::from_str("cuda:2").unwrap();
        assert_eq!(device, DeviceType::Cuda(2));
        assert_eq!(serde_json::to_string(&DeviceType::Metal(0)).unwrap(), "\"metal:0\"");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load("/nonexistent/sentiment_pipeline.json").unwrap_err();
        assert!(matches!(err, Error::ArtifactLoad(_)));
    }
}
