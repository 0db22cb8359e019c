//! Service configuration

use sentra_classifiers::{ConfidencePolicy, DeviceType, LabelMap};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Pipeline artifact loaded once at startup
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Inference device
    #[serde(default)]
    pub device: DeviceType,

    /// Class index to sentiment label
    #[serde(default)]
    pub labels: LabelMap,

    /// Upper bound on texts per batch request; `null` disables it
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: Option<usize>,

    /// Which probability is reported as the confidence
    #[serde(default)]
    pub confidence: ConfidencePolicy,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,

    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(cli);
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply_overrides(&mut self, cli: &crate::Cli) {
        if let Some(model) = &cli.model {
            self.model_path = model.clone();
        }

        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }
    }

    /// Socket address to bind; `listen` may be IPv4 or IPv6
    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .listen
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", self.listen, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            device: DeviceType::default(),
            labels: LabelMap::default(),
            max_batch_size: default_max_batch_size(),
            confidence: ConfidencePolicy::default(),
            max_body_bytes: default_max_body_bytes(),
            cors: CorsConfig::default(),
            listen: default_listen(),
            port: default_port(),
        }
    }
}

/// Cross-origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any origin without credentials
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Allow cookies and auth headers on cross-origin requests
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_credentials: true,
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("sentiment_pipeline.json")
}

fn default_max_batch_size() -> Option<usize> {
    Some(1024)
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}
