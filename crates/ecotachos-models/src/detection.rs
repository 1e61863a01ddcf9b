//! Detection records and per-user statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::WasteCategory;
use crate::utils::{f64_lenient, opt_f64_lenient, round2, round_coordinate, string_or_empty};

pub type DeteccionId = i64;

/// Fallback coordinates (Cuenca city center) when a bin has none.
pub const DEFAULT_LAT: f64 = -2.90055;
pub const DEFAULT_LON: f64 = -79.00453;

/// A detection as returned by `/detecciones/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deteccion {
    pub id: DeteccionId,
    #[serde(default)]
    pub tacho: Option<i64>,
    #[serde(default)]
    pub usuario: Option<i64>,
    #[serde(default)]
    pub clasificacion: Option<String>,
    /// Confidence in percent
    #[serde(default, deserialize_with = "f64_lenient")]
    pub confianza_ia: f64,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub ubicacion_lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub ubicacion_lon: Option<f64>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub descripcion: String,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub procesado: bool,
    #[serde(default = "default_true")]
    pub activo: bool,
    #[serde(default)]
    pub fecha_registro: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Fields of a new detection, posted as multipart together with the image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDeteccion {
    pub tacho: Option<i64>,
    pub usuario: i64,
    pub clasificacion: WasteCategory,
    /// Confidence in percent, 2 decimals
    pub confianza_ia: f64,
    pub ubicacion_lat: f64,
    pub ubicacion_lon: f64,
    pub descripcion: String,
    pub procesado: bool,
    pub activo: bool,
}

impl NewDeteccion {
    /// Build a record for a classified image.
    ///
    /// `confidence` is a 0-1 fraction. Coordinates come from the bin and fall
    /// back to [`DEFAULT_LAT`]/[`DEFAULT_LON`].
    pub fn new(
        usuario: i64,
        tacho: Option<(i64, Option<(f64, f64)>)>,
        clasificacion: WasteCategory,
        confidence: f64,
        materials: &[String],
    ) -> Self {
        let (tacho_id, coords) = match tacho {
            Some((id, coords)) => (Some(id), coords),
            None => (None, None),
        };
        let (lat, lon) = coords.unwrap_or((DEFAULT_LAT, DEFAULT_LON));
        let materials = if materials.is_empty() {
            "No identificado".to_string()
        } else {
            materials.join(", ")
        };

        Self {
            tacho: tacho_id,
            usuario,
            clasificacion,
            confianza_ia: round2(confidence * 100.0),
            ubicacion_lat: round_coordinate(lat),
            ubicacion_lon: round_coordinate(lon),
            descripcion: format!(
                "Clasificación IA: {}. Confianza: {:.1}%. Materiales: {}",
                clasificacion,
                confidence * 100.0,
                materials
            ),
            procesado: true,
            activo: true,
        }
    }

    /// Form fields in wire order, stringified.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("tacho", self.tacho.map(|id| id.to_string()).unwrap_or_default()),
            ("usuario", self.usuario.to_string()),
            ("clasificacion", self.clasificacion.to_string()),
            ("confianza_ia", self.confianza_ia.to_string()),
            ("ubicacion_lat", self.ubicacion_lat.to_string()),
            ("ubicacion_lon", self.ubicacion_lon.to_string()),
            ("descripcion", self.descripcion.clone()),
            ("procesado", self.procesado.to_string()),
            ("activo", self.activo.to_string()),
        ]
    }
}

/// Aggregate statistics over a set of detections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionStats {
    pub total: usize,
    /// Count per lowercase classification; missing classification is "otro"
    pub por_clasificacion: BTreeMap<String, usize>,
    /// Mean confidence in percent, 0 when empty
    pub confianza_promedio: f64,
}

impl DetectionStats {
    pub fn from_detections<'a, I>(detections: I) -> Self
    where
        I: IntoIterator<Item = &'a Deteccion>,
    {
        let mut stats = DetectionStats::default();
        let mut sum = 0.0;

        for det in detections {
            stats.total += 1;
            let key = det
                .clasificacion
                .as_deref()
                .map(str::to_lowercase)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "otro".to_string());
            *stats.por_clasificacion.entry(key).or_insert(0) += 1;
            sum += det.confianza_ia;
        }

        if stats.total > 0 {
            stats.confianza_promedio = sum / stats.total as f64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(id: i64, clasificacion: Option<&str>, confianza: f64) -> Deteccion {
        Deteccion {
            id,
            tacho: None,
            usuario: Some(1),
            clasificacion: clasificacion.map(String::from),
            confianza_ia: confianza,
            ubicacion_lat: None,
            ubicacion_lon: None,
            descripcion: String::new(),
            imagen: None,
            procesado: true,
            activo: true,
            fecha_registro: None,
        }
    }

    #[test]
    fn test_stats_empty() {
        let stats = DetectionStats::from_detections(&Vec::<Deteccion>::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.confianza_promedio, 0.0);
        assert!(stats.por_clasificacion.is_empty());
    }

    #[test]
    fn test_stats_counts_and_average() {
        let dets = vec![
            det(1, Some("Organico"), 80.0),
            det(2, Some("organico"), 90.0),
            det(3, None, 70.0),
            det(4, Some("reciclable"), 60.0),
        ];
        let stats = DetectionStats::from_detections(&dets);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.por_clasificacion["organico"], 2);
        assert_eq!(stats.por_clasificacion["otro"], 1);
        assert_eq!(stats.por_clasificacion["reciclable"], 1);
        assert!((stats.confianza_promedio - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_string_confidence() {
        let d: Deteccion = serde_json::from_str(
            r#"{"id": 3, "clasificacion": "reciclable", "confianza_ia": "87.50", "fecha_registro": "2025-11-02T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(d.confianza_ia, 87.5);
        assert!(d.fecha_registro.is_some());
    }

    #[test]
    fn test_null_confidence_keeps_the_list() {
        let dets: Vec<Deteccion> = serde_json::from_str(
            r#"[
                {"id": 1, "clasificacion": "organico", "confianza_ia": 80.0},
                {"id": 2, "clasificacion": "reciclable", "confianza_ia": null, "descripcion": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[1].confianza_ia, 0.0);
        assert_eq!(dets[1].descripcion, "");

        let stats = DetectionStats::from_detections(&dets);
        assert_eq!(stats.total, 2);
        assert!((stats.confianza_promedio - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_deteccion_defaults_coordinates() {
        let new = NewDeteccion::new(5, Some((2, None)), WasteCategory::Organico, 0.4612, &[]);
        assert_eq!(new.tacho, Some(2));
        assert_eq!(new.ubicacion_lat, DEFAULT_LAT);
        assert_eq!(new.ubicacion_lon, DEFAULT_LON);
        assert_eq!(new.confianza_ia, 46.12);
        assert!(new.descripcion.contains("Materiales: No identificado"));
        assert!(new.descripcion.contains("Confianza: 46.1%"));
    }

    #[test]
    fn test_form_fields_order() {
        let new = NewDeteccion::new(
            5,
            Some((2, Some((-2.1, -79.2)))),
            WasteCategory::Reciclable,
            0.9,
            &["reciclable".into(), "inorganico".into()],
        );
        let fields = new.form_fields();
        assert_eq!(fields[0], ("tacho", "2".to_string()));
        assert_eq!(fields[2], ("clasificacion", "reciclable".to_string()));
        assert_eq!(fields[7], ("procesado", "true".to_string()));
    }
}
