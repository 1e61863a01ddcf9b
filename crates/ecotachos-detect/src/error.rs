//! Detection workflow errors.

use ecotachos_ai_client::AiError;
use ecotachos_api_client::ApiError;
use ecotachos_capture::CaptureError;
use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("No hay imagen para procesar")]
    NoImage,

    #[error("El motor local Ultralytics no tiene pesos configurados (AI_WEIGHTS).")]
    MissingWeights,

    #[error("No hay resultado para guardar")]
    NoResult,

    #[error("Debes iniciar sesión para guardar detecciones")]
    NotLoggedIn,

    /// The user owns bins but did not pick one.
    #[error("Selecciona un tacho para guardar la detección")]
    TachoRequired,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
