//! Mapping detection outcomes onto what the user sees.

use ecotachos_ai_client::DetectionOutcome;
use ecotachos_capture::CaptureError;
use ecotachos_models::{CategoryDisplay, ClassificationResult, WasteCategory};
use serde::Serialize;

/// Number of alternative predictions shown under the primary result.
pub const MAX_ALTERNATIVES: usize = 3;

pub const NO_DETECTION_MESSAGE: &str = "No se detectaron objetos en la imagen";
pub const UNEXPECTED_MESSAGE: &str = "Respuesta inesperada del servidor";

pub const NO_DETECTION_SUGGESTIONS: &[&str] = &[
    "Asegúrate de que el objeto esté bien iluminado",
    "Intenta acercar más la cámara al objeto",
    "Verifica que el objeto esté en el centro de la imagen",
];

pub const TRANSPORT_SUGGESTIONS: &[&str] = &[
    "Verifica tu conexión a internet",
    "Intenta de nuevo en unos momentos",
    "Contacta al administrador si el problema persiste",
];

pub const UNEXPECTED_SUGGESTIONS: &[&str] = &["Intenta de nuevo", "Contacta al soporte técnico"];

pub const NO_IMAGE_SUGGESTIONS: &[&str] = &["Captura o sube una imagen primero"];

pub const MISSING_WEIGHTS_SUGGESTIONS: &[&str] = &[
    "Configura la variable AI_WEIGHTS apuntando al archivo .pt",
    "Reinicia el backend tras configurar los pesos",
    "Usa Roboflow (AI_ENGINE=roboflow) temporalmente si no tienes pesos locales",
];

pub const INVALID_UPLOAD_SUGGESTIONS: &[&str] = &["Usa una imagen JPG, PNG o WebP de hasta 10MB"];

/// Display status of the detection panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Image loaded (or nothing yet), waiting for the user
    #[default]
    Ready,
    /// Inference request in flight
    Processing,
    /// A classification is displayed
    Complete,
    /// An error view is displayed
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Ready => "ready",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Complete => "complete",
            ProcessingStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ranked alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeView {
    /// Label as sent by the service
    pub categoria: String,
    pub category: WasteCategory,
    pub info: CategoryDisplay,
    pub confidence: f64,
    pub confidence_label: String,
}

/// A successful classification, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub category: WasteCategory,
    pub info: CategoryDisplay,
    pub confidence: f64,
    pub confidence_label: String,
    pub alternatives: Vec<AlternativeView>,
}

impl ResultView {
    pub fn from_result(result: &ClassificationResult) -> Self {
        let category = result.category();
        Self {
            category,
            info: CategoryDisplay::resolve(category, result.category_info.as_ref()),
            confidence: result.confidence(),
            confidence_label: format_confidence(result.confidence()),
            alternatives: result
                .top(MAX_ALTERNATIVES)
                .iter()
                .map(|p| AlternativeView {
                    categoria: p.categoria.clone(),
                    category: p.category(),
                    info: p.category().info().into(),
                    confidence: p.confianza,
                    confidence_label: format_confidence(p.confianza),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The model found nothing; shown as a warning
    NoDetection,
    /// Network failure or non-2xx answer
    Transport,
    /// A 2xx body of unknown shape
    Unexpected,
    /// Rejected locally before any request
    Validation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ErrorView {
    pub fn new(kind: ErrorKind, message: impl Into<String>, suggestions: &[&str]) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: owned(suggestions),
        }
    }

    /// Heading shown above the message.
    pub fn title(&self) -> &'static str {
        match self.kind {
            ErrorKind::NoDetection => "No se detectaron objetos",
            _ => "Error en el análisis",
        }
    }

    pub fn no_image() -> Self {
        Self::new(ErrorKind::Validation, "No hay imagen para procesar", NO_IMAGE_SUGGESTIONS)
    }

    pub fn missing_weights() -> Self {
        Self::new(
            ErrorKind::Validation,
            "El motor local Ultralytics no tiene pesos configurados (AI_WEIGHTS).",
            MISSING_WEIGHTS_SUGGESTIONS,
        )
    }

    /// Inline error for a rejected upload or camera failure.
    pub fn from_capture(error: &CaptureError) -> Self {
        let suggestions: &[&str] = if error.is_validation() {
            INVALID_UPLOAD_SUGGESTIONS
        } else {
            &[]
        };
        Self::new(ErrorKind::Validation, error.to_string(), suggestions)
    }
}

/// What the detection panel shows after an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Presentation {
    Result(ResultView),
    Error(ErrorView),
}

impl Presentation {
    pub fn status(&self) -> ProcessingStatus {
        match self {
            Presentation::Result(_) => ProcessingStatus::Complete,
            Presentation::Error(_) => ProcessingStatus::Error,
        }
    }

    pub fn as_result(&self) -> Option<&ResultView> {
        match self {
            Presentation::Result(view) => Some(view),
            Presentation::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorView> {
        match self {
            Presentation::Error(view) => Some(view),
            Presentation::Result(_) => None,
        }
    }
}

/// Map an outcome to its view.
pub fn present(outcome: &DetectionOutcome) -> Presentation {
    match outcome {
        DetectionOutcome::Classified(result) => Presentation::Result(ResultView::from_result(result)),
        DetectionOutcome::NoDetection {
            message,
            suggestions,
        } => Presentation::Error(ErrorView {
            kind: ErrorKind::NoDetection,
            message: message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| NO_DETECTION_MESSAGE.to_string()),
            suggestions: suggestions
                .clone()
                .unwrap_or_else(|| owned(NO_DETECTION_SUGGESTIONS)),
        }),
        DetectionOutcome::Failed { message } => Presentation::Error(ErrorView::new(
            ErrorKind::Transport,
            message.clone(),
            TRANSPORT_SUGGESTIONS,
        )),
        DetectionOutcome::Unexpected => Presentation::Error(ErrorView::new(
            ErrorKind::Unexpected,
            UNEXPECTED_MESSAGE,
            UNEXPECTED_SUGGESTIONS,
        )),
    }
}

/// Percent with up to two decimals, trailing zeros dropped: `87.5%`, `90%`.
pub fn format_confidence(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecotachos_models::{Prediction, RemoteCategoryInfo};

    fn classified(categoria: &str, confianza: f64) -> DetectionOutcome {
        DetectionOutcome::Classified(ClassificationResult {
            primary: Prediction::new(categoria, confianza),
            alternatives: vec![
                Prediction::new(categoria, confianza),
                Prediction::new("inorganico", 8.0),
                Prediction::new("organico", 3.5),
                Prediction::new("metal", 1.0),
            ],
            category_info: None,
        })
    }

    #[test]
    fn test_reciclable_result() {
        let presentation = present(&classified("reciclable", 87.5));
        assert_eq!(presentation.status(), ProcessingStatus::Complete);

        let view = presentation.as_result().unwrap();
        assert_eq!(view.category, WasteCategory::Reciclable);
        assert_eq!(view.info.label, "RECICLABLE");
        assert_eq!(view.info.color, "#3b82f6");
        assert_eq!(view.info.icon, "R");
        assert_eq!(view.confidence_label, "87.5%");
        assert_eq!(view.alternatives.len(), MAX_ALTERNATIVES);
        assert_eq!(view.alternatives[2].confidence_label, "3.5%");
    }

    #[test]
    fn test_unknown_category_falls_back_to_inorganico() {
        let view = present(&classified("metal", 50.0));
        let view = view.as_result().unwrap();
        assert_eq!(view.category, WasteCategory::Inorganico);
        assert_eq!(view.info.label, "INORGÁNICO");
    }

    #[test]
    fn test_server_category_info_wins() {
        let outcome = DetectionOutcome::Classified(ClassificationResult {
            primary: Prediction::new("organico", 70.0),
            alternatives: vec![],
            category_info: Some(RemoteCategoryInfo {
                label: Some("COMPOSTABLE".into()),
                ..Default::default()
            }),
        });
        let view = present(&outcome);
        let view = view.as_result().unwrap();
        assert_eq!(view.info.label, "COMPOSTABLE");
        assert_eq!(view.info.color, "#10b981");
    }

    #[test]
    fn test_no_detection_uses_server_suggestions() {
        let outcome = DetectionOutcome::NoDetection {
            message: None,
            suggestions: Some(vec!["uno".into(), "dos".into(), "tres".into()]),
        };
        let presentation = present(&outcome);
        assert!(presentation.as_result().is_none());

        let error = presentation.as_error().unwrap();
        assert_eq!(error.kind, ErrorKind::NoDetection);
        assert_eq!(error.suggestions, vec!["uno", "dos", "tres"]);
        assert_eq!(error.message, NO_DETECTION_MESSAGE);
        assert_eq!(error.title(), "No se detectaron objetos");
    }

    #[test]
    fn test_no_detection_default_suggestions() {
        let outcome = DetectionOutcome::NoDetection {
            message: Some("Nada".into()),
            suggestions: None,
        };
        let presentation = present(&outcome);
        let error = presentation.as_error().unwrap();
        assert_eq!(error.message, "Nada");
        assert_eq!(error.suggestions.len(), NO_DETECTION_SUGGESTIONS.len());
    }

    #[test]
    fn test_failed_and_unexpected() {
        let presentation = present(&DetectionOutcome::Failed {
            message: "Timeout".into(),
        });
        let error = presentation.as_error().unwrap();
        assert_eq!(error.kind, ErrorKind::Transport);
        assert_eq!(error.message, "Timeout");
        assert_eq!(error.suggestions.len(), 3);
        assert_eq!(error.title(), "Error en el análisis");

        let presentation = present(&DetectionOutcome::Unexpected);
        let error = presentation.as_error().unwrap();
        assert_eq!(error.kind, ErrorKind::Unexpected);
        assert_eq!(error.message, UNEXPECTED_MESSAGE);
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(87.5), "87.5%");
        assert_eq!(format_confidence(90.0), "90%");
        assert_eq!(format_confidence(33.333), "33.33%");
        assert_eq!(format_confidence(0.0), "0%");
        assert_eq!(format_confidence(100.0), "100%");
    }
}
