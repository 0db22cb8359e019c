//! Sentra Server
//!
//! HTTP transport for the sentiment inference pipeline: request parsing,
//! CORS, metrics, and response serialization around the inference ops in
//! `sentra-classifiers`.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{CorsConfig, ServiceConfig};
pub use routes::{create_router, AppError, HEALTH_MESSAGE};
pub use state::AppState;
