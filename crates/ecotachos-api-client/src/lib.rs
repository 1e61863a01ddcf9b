//! REST client for the EcoTachos backend.
//!
//! Provides:
//! - An explicit [`Session`] persisted through a [`TokenStore`]
//! - Auth flows (password, registration, identity-provider exchange, reset)
//! - CRUD for bins, users, locations and detections
//! - Dashboard aggregation

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod resources;
pub mod session;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use resources::{CantonForm, DetectionImage};
pub use session::{Session, TokenStore};
