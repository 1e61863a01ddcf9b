//! Capture error types.

use thiserror::Error;

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors surfaced while acquiring an image.
///
/// Display strings are user-facing and shown inline next to the picker.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Formato de archivo no válido. Usa JPG, PNG o WebP.")]
    InvalidFormat { declared: Option<String> },

    #[error("La imagen es demasiado grande (máximo {}MB)", .max / (1024 * 1024))]
    TooLarge { size: u64, max: u64 },

    #[error("No se detecta ninguna cámara conectada.")]
    NoCamera,

    #[error("No se pudo acceder a la cámara. Verifica permisos o conexión.")]
    CameraUnavailable(String),

    #[error("Error al capturar la imagen: {0}")]
    Frame(String),

    #[error("Data URL inválida: {0}")]
    InvalidDataUrl(String),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// Validation failures are reported inline and never retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, CaptureError::InvalidFormat { .. } | CaptureError::TooLarge { .. })
    }
}
