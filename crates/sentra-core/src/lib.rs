//! Sentra Core
//!
//! Types shared by every Sentra component.
//!
//! This crate provides:
//! - The error taxonomy (artifact load, validation, inference) and result alias
//! - Request payloads for single and batch scoring
//! - Response payloads and the shaping/rounding rules applied to them

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    round_confidence, BatchInput, BatchResult, HealthStatus, PredictionResult, TextInput,
    CONFIDENCE_DECIMALS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{BatchInput, BatchResult, PredictionResult, TextInput};
}
