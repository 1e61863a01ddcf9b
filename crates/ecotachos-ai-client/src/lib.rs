//! Client for the EcoTachos AI classification service.
//!
//! This crate sends captured images to the backend's `/ia/` endpoints,
//! interprets the response envelope into a [`DetectionOutcome`], and
//! provides a fixed-attempt linear retry loop. It also talks to the
//! serverless detection logger.

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;
pub mod retry;
pub mod serverless;
pub mod types;

pub use client::AiClient;
pub use config::AiClientConfig;
pub use error::{AiError, AiResult};
pub use outcome::DetectionOutcome;
pub use retry::{retry_linear, RetryPolicy};
pub use serverless::{DetectionEvent, ServerlessClient, ServerlessConfig};
pub use types::{AiHealth, DetectResponse, ImageInput, ModelInfo};
