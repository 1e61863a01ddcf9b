//! Authentication payloads and the bearer-token seam.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::usuario::Usuario;
use crate::validation::{self, FieldKind, FieldOptions};

/// Source of the bearer token attached to backend requests.
///
/// Implemented by the session; HTTP clients take it as
/// `Arc<dyn TokenProvider>` instead of reading ambient state.
pub trait TokenProvider: Send + Sync {
    /// Current token, if logged in.
    fn bearer_token(&self) -> Option<String>;

    /// Called when the backend answers 401 for a request carrying the token.
    fn invalidate(&self);
}

/// Email/password login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Self-service registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100), custom(function = "validate_letters"))]
    pub nombre: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub telefono: Option<String>,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

fn validate_letters(value: &str) -> Result<(), ValidationError> {
    validation::validate_field(value, FieldKind::Nombre, FieldOptions::required().with_bounds(2, 100))
        .map_err(|msg| ValidationError::new("nombre").with_message(msg.into()))
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    validation::validate_field(value, FieldKind::Telefono, FieldOptions::default())
        .map_err(|msg| ValidationError::new("telefono").with_message(msg.into()))
}

fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || !validation::is_strong_password(value) {
        return Err(ValidationError::new("password")
            .with_message(validation::messages::CONTRASENA_DEBIL.into()));
    }
    Ok(())
}

/// Identity-provider token exchanged for an application session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    /// ID token issued by the identity provider
    pub token: String,
}

/// Response of login, register and the Google exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Usuario,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Completes a reset started from the emailed link.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub token: String,
    pub uidb64: String,
}

/// Profile update payload. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            nombre: "Ana María".into(),
            email: "ana@example.com".into(),
            telefono: Some("0991234567".into()),
            password: "Secreta123".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            nombre: "A".into(),
            email: "not-an-email".into(),
            telefono: Some("123".into()),
            password: "weak".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nombre"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("telefono"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_login_validation() {
        let req = LoginRequest {
            email: "ana@example.com".into(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_profile_update_skips_unset() {
        let update = ProfileUpdate {
            telefono: Some("0991234567".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"telefono": "0991234567"}));
    }
}
