//! Interpretation of the detection envelope.

use ecotachos_models::ClassificationResult;
use serde::Serialize;

use crate::error::AiError;
use crate::types::DetectResponse;

/// Fallback message when neither the body nor the transport said anything.
pub const GENERIC_FAILURE: &str = "Error en detección IA";

/// What a detection request produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetectionOutcome {
    /// A primary category was identified.
    Classified(ClassificationResult),
    /// The model found nothing. Not an error.
    NoDetection {
        message: Option<String>,
        suggestions: Option<Vec<String>>,
    },
    /// Transport or server failure.
    Failed { message: String },
    /// A 2xx body matching none of the known shapes.
    Unexpected,
}

impl DetectionOutcome {
    /// Interpret a 2xx body.
    ///
    /// A missing `success` field counts as success.
    pub fn from_body(body: DetectResponse) -> Self {
        let success = body.success.unwrap_or(true);

        if !success {
            if let Some(error) = body.error.filter(|e| !e.is_empty()) {
                return DetectionOutcome::Failed { message: error };
            }
        }

        if body.no_detection {
            return DetectionOutcome::NoDetection {
                message: body.message,
                suggestions: body.suggestions,
            };
        }

        match body.clasificacion_principal {
            Some(primary) if success => DetectionOutcome::Classified(ClassificationResult {
                primary,
                alternatives: body.top_predicciones,
                category_info: body.category_info,
            }),
            _ => DetectionOutcome::Unexpected,
        }
    }

    /// Interpret a failed request.
    ///
    /// The message prefers what the server said, then the transport text.
    pub fn from_error(error: &AiError) -> Self {
        let message = match error {
            AiError::Http {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            other => other.transport_text(),
        };
        Self::failed(message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        DetectionOutcome::Failed {
            message: if message.trim().is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                message
            },
        }
    }

    /// Interpret the result of a raw detection call.
    pub fn from_result(result: Result<DetectResponse, AiError>) -> Self {
        match result {
            Ok(body) => Self::from_body(body),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, DetectionOutcome::Classified(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecotachos_models::{Prediction, WasteCategory};
    use reqwest::StatusCode;

    #[test]
    fn test_classified_without_success_field() {
        let body = DetectResponse {
            clasificacion_principal: Some(Prediction::new("reciclable", 87.5)),
            top_predicciones: vec![Prediction::new("reciclable", 87.5)],
            ..Default::default()
        };
        match DetectionOutcome::from_body(body) {
            DetectionOutcome::Classified(result) => {
                assert_eq!(result.category(), WasteCategory::Reciclable);
                assert_eq!(result.alternatives.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_no_detection() {
        let body = DetectResponse {
            success: Some(false),
            no_detection: true,
            message: Some("Sin objetos".into()),
            ..Default::default()
        };
        assert_eq!(
            DetectionOutcome::from_body(body),
            DetectionOutcome::NoDetection {
                message: Some("Sin objetos".into()),
                suggestions: None,
            }
        );
    }

    #[test]
    fn test_body_error_on_success_false() {
        let body = DetectResponse {
            success: Some(false),
            error: Some("Modelo no disponible".into()),
            ..Default::default()
        };
        assert_eq!(
            DetectionOutcome::from_body(body),
            DetectionOutcome::Failed {
                message: "Modelo no disponible".into()
            }
        );
    }

    #[test]
    fn test_unexpected_shapes() {
        assert_eq!(
            DetectionOutcome::from_body(DetectResponse::default()),
            DetectionOutcome::Unexpected
        );
        let body = DetectResponse {
            success: Some(false),
            clasificacion_principal: Some(Prediction::new("organico", 50.0)),
            ..Default::default()
        };
        assert_eq!(DetectionOutcome::from_body(body), DetectionOutcome::Unexpected);
    }

    #[test]
    fn test_failure_message_preference() {
        let err = AiError::Http {
            status: StatusCode::BAD_REQUEST,
            message: Some("Imagen corrupta".into()),
        };
        assert_eq!(
            DetectionOutcome::from_error(&err),
            DetectionOutcome::Failed {
                message: "Imagen corrupta".into()
            }
        );

        let err = AiError::Http {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: None,
        };
        assert_eq!(
            DetectionOutcome::from_error(&err),
            DetectionOutcome::Failed {
                message: "Request failed with status code 503".into()
            }
        );

        assert_eq!(
            DetectionOutcome::failed(""),
            DetectionOutcome::Failed {
                message: GENERIC_FAILURE.into()
            }
        );
    }
}
