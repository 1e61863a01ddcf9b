//! AI service request/response types.

use ecotachos_capture::{EncodedImage, SelectedFile};
use ecotachos_models::{Prediction, RemoteCategoryInfo};
use serde::{Deserialize, Serialize};

/// Image as handed to [`AiClient::detect`](crate::AiClient::detect).
///
/// Data URLs are sent as a JSON body; raw files as a multipart form.
#[derive(Debug, Clone)]
pub enum ImageInput {
    DataUrl(EncodedImage),
    File {
        name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl From<EncodedImage> for ImageInput {
    fn from(image: EncodedImage) -> Self {
        ImageInput::DataUrl(image)
    }
}

impl From<SelectedFile> for ImageInput {
    fn from(file: SelectedFile) -> Self {
        ImageInput::File {
            mime: file
                .declared_mime
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            name: file.name,
            bytes: file.bytes,
        }
    }
}

/// JSON body for the data-URL request form.
#[derive(Debug, Serialize)]
pub(crate) struct DetectJsonRequest<'a> {
    pub imagen: &'a str,
}

/// Envelope returned by `POST /ia/detect/`.
///
/// Every field is optional on the wire; interpretation lives in
/// [`DetectionOutcome`](crate::DetectionOutcome).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub clasificacion_principal: Option<Prediction>,
    #[serde(default)]
    pub top_predicciones: Vec<Prediction>,
    #[serde(default)]
    pub category_info: Option<RemoteCategoryInfo>,
    #[serde(default)]
    pub no_detection: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /ia/health/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiHealth {
    /// `local` or `roboflow`
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub weights_exists: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AiHealth {
    pub fn is_local(&self) -> bool {
        self.engine.as_deref() == Some("local")
    }

    /// A local engine that reported missing weights cannot classify.
    pub fn missing_weights(&self) -> bool {
        self.is_local() && self.weights_exists == Some(false)
    }

    pub fn engine_label(&self) -> &'static str {
        if self.is_local() {
            "Ultralytics (motor local)"
        } else {
            "Roboflow"
        }
    }
}

/// `GET /ia/info/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Error body shape shared by the backend's failure responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// `error`, then `message`, then `detail`.
    pub fn into_message(self) -> Option<String> {
        self.error
            .filter(|s| !s.is_empty())
            .or(self.message.filter(|s| !s.is_empty()))
            .or(self.detail.filter(|s| !s.is_empty()))
    }
}
