//! Classification results produced by the inference service.

use serde::{Deserialize, Serialize};

use crate::category::{RemoteCategoryInfo, WasteCategory};
use crate::utils::f64_lenient;

/// One ranked prediction as returned by the service.
///
/// `categoria` is kept as the raw string; mapping to [`WasteCategory`]
/// happens at lookup time so unknown labels survive deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub categoria: String,
    /// Confidence in percent (0-100)
    #[serde(deserialize_with = "f64_lenient")]
    pub confianza: f64,
}

impl Prediction {
    pub fn new(categoria: impl Into<String>, confianza: f64) -> Self {
        Self {
            categoria: categoria.into(),
            confianza,
        }
    }

    /// Category with fallback for unknown labels.
    pub fn category(&self) -> WasteCategory {
        WasteCategory::from_key(&self.categoria)
    }
}

/// Successful classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Primary (top-1) prediction
    pub primary: Prediction,
    /// Ranked alternatives, in the order the service sent them
    #[serde(default)]
    pub alternatives: Vec<Prediction>,
    /// Category metadata sent by the service, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_info: Option<RemoteCategoryInfo>,
}

impl ClassificationResult {
    /// Primary category with fallback.
    pub fn category(&self) -> WasteCategory {
        self.primary.category()
    }

    /// Primary confidence in percent.
    pub fn confidence(&self) -> f64 {
        self.primary.confianza
    }

    /// Confidence as a 0-1 fraction.
    pub fn confidence_fraction(&self) -> f64 {
        (self.primary.confianza / 100.0).clamp(0.0, 1.0)
    }

    /// First `n` alternatives.
    pub fn top(&self, n: usize) -> &[Prediction] {
        &self.alternatives[..self.alternatives.len().min(n)]
    }
}
