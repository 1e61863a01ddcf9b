//! Waste bins ("tachos").

use serde::{Deserialize, Serialize};

use crate::utils::{f64_lenient, opt_f64_lenient, string_or_empty};
use crate::validation::sanitize;

pub type TachoId = i64;

/// Bin ownership model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TachoTipo {
    /// Public bin managed by a company
    #[default]
    Publico,
    /// Bin owned by a single user
    Personal,
}

/// A bin as returned by `/tachos/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tacho {
    pub id: TachoId,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub codigo: String,
    pub nombre: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub descripcion: String,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub ubicacion_lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub ubicacion_lon: Option<f64>,
    #[serde(default)]
    pub canton: Option<i64>,
    #[serde(default = "default_estado")]
    pub estado: String,
    /// Fill level in percent
    #[serde(default, deserialize_with = "f64_lenient")]
    pub nivel_llenado: f64,
    #[serde(default)]
    pub tipo: TachoTipo,
    /// Owner for personal bins, manager for public ones
    #[serde(default)]
    pub propietario: Option<i64>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub empresa_nombre: String,
    /// Cleared by the soft delete
    #[serde(default = "default_true")]
    pub activo: bool,
}

fn default_true() -> bool {
    true
}

fn default_estado() -> String {
    "activo".to_string()
}

impl Tacho {
    /// Bins related to a user: the ones they own or manage.
    pub fn belongs_to(&self, user_id: i64) -> bool {
        self.propietario == Some(user_id)
    }

    /// Coordinates if both are set.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.ubicacion_lat, self.ubicacion_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Payload for creating or replacing a bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TachoInput {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    pub ubicacion_lat: Option<f64>,
    pub ubicacion_lon: Option<f64>,
    pub canton: Option<i64>,
    pub estado: String,
    /// Always 0 on create and update
    pub nivel_llenado: f64,
    pub tipo: TachoTipo,
    pub propietario: Option<i64>,
    pub empresa_nombre: String,
}

impl TachoInput {
    /// Normalize as the bin form does before sending: sanitizes code and name,
    /// resets the fill level and clears the company name for personal bins.
    pub fn normalized(mut self) -> Self {
        self.codigo = sanitize(&self.codigo);
        self.nombre = sanitize(&self.nombre);
        self.nivel_llenado = 0.0;
        if self.tipo != TachoTipo::Publico {
            self.empresa_nombre.clear();
        }
        self
    }
}

/// Sort bins by name, the order used by the bin picker.
pub fn sort_by_name(tachos: &mut [Tacho]) {
    tachos.sort_by(|a, b| a.nombre.cmp(&b.nombre));
}
