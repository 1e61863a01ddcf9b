//! Shared data models for the EcoTachos client.
//!
//! This crate provides Serde-serializable types for:
//! - Waste categories and their display metadata
//! - Classification results from the inference service
//! - Bins, users, locations and detections from the backend
//! - Auth payloads and the token-provider seam
//! - Form field validation rules

pub mod auth;
pub mod category;
pub mod classification;
pub mod dashboard;
pub mod detection;
pub mod tacho;
pub mod ubicacion;
pub mod usuario;
pub mod utils;
pub mod validation;

// Re-export common types
pub use auth::{
    AuthResponse, GoogleLoginRequest, LoginRequest, PasswordResetConfirm, PasswordResetRequest,
    ProfileUpdate, RegisterRequest, TokenProvider,
};
pub use category::{CategoryDisplay, CategoryInfo, RemoteCategoryInfo, WasteCategory};
pub use classification::{ClassificationResult, Prediction};
pub use dashboard::DashboardStats;
pub use detection::{Deteccion, DetectionStats, NewDeteccion};
pub use tacho::{Tacho, TachoInput, TachoTipo};
pub use ubicacion::{Canton, CantonInput, Ciudad, NewCiudad, NewProvincia, Provincia};
pub use usuario::{Rol, Usuario, UsuarioInput};
pub use validation::{validate_field, FieldKind, FieldOptions};
