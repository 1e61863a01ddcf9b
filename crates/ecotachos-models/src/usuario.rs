//! Users.

use serde::{Deserialize, Serialize};

pub type UsuarioId = i64;

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Admin,
    #[default]
    User,
}

impl Rol {
    pub fn is_admin(&self) -> bool {
        matches!(self, Rol::Admin)
    }
}

/// A user as returned by `/usuarios/` and the profile endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: UsuarioId,
    pub nombre: String,
    pub email: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub provincia: Option<i64>,
    #[serde(default)]
    pub ciudad: Option<i64>,
    #[serde(default)]
    pub canton: Option<i64>,
    #[serde(default)]
    pub rol: Rol,
    #[serde(default = "default_true")]
    pub activo: bool,
}

fn default_true() -> bool {
    true
}

/// Payload for creating or replacing a user.
///
/// `password` is only sent when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsuarioInput {
    pub nombre: String,
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    pub provincia: Option<i64>,
    pub ciudad: Option<i64>,
    pub canton: Option<i64>,
    pub rol: Rol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UsuarioInput {
    /// Drop a blank password so an update keeps the current one.
    pub fn normalized(mut self) -> Self {
        if self.password.as_deref().map(str::trim).is_some_and(str::is_empty) {
            self.password = None;
        }
        self
    }
}
