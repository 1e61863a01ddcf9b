//! Persisting a classification as a detection record.

use std::path::Path;

use ecotachos_ai_client::ImageInput;
use ecotachos_api_client::{ApiClient, DetectionImage};
use ecotachos_models::{ClassificationResult, Deteccion, NewDeteccion, Tacho, Usuario};
use tracing::{debug, info, warn};

use crate::error::{DetectError, DetectResult};
use crate::workflow::DetectionWorkflow;

const IMAGE_STEM: &str = "deteccion";

/// Build the record for `result`, taken by `user` at `tacho`.
///
/// Materials are the labels of the ranked predictions.
pub fn build_record(user: &Usuario, tacho: Option<&Tacho>, result: &ClassificationResult) -> NewDeteccion {
    let materials: Vec<String> = result
        .alternatives
        .iter()
        .map(|p| p.categoria.clone())
        .collect();
    NewDeteccion::new(
        user.id,
        tacho.map(|t| (t.id, t.coordinates())),
        result.category(),
        result.confidence_fraction(),
        &materials,
    )
}

/// Raw image bytes as uploaded with the record.
pub fn detection_image(image: &ImageInput) -> DetectResult<DetectionImage> {
    match image {
        ImageInput::DataUrl(encoded) => Ok(DetectionImage {
            file_name: format!("{}.{}", IMAGE_STEM, encoded.file_extension()),
            mime: encoded.mime_type().to_string(),
            bytes: encoded.decode()?,
        }),
        ImageInput::File { name, mime, bytes } => {
            let ext = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("jpg");
            Ok(DetectionImage {
                file_name: format!("{}.{}", IMAGE_STEM, ext.to_lowercase()),
                mime: mime.clone(),
                bytes: bytes.clone(),
            })
        }
    }
}

/// Post the detection, then tell the bin which compartment to open.
///
/// The IoT notification only happens when a bin is selected; its failure is
/// logged and does not fail the save.
pub async fn save_detection(
    api: &ApiClient,
    user: &Usuario,
    tacho: Option<&Tacho>,
    result: &ClassificationResult,
    image: &ImageInput,
) -> DetectResult<Deteccion> {
    let record = build_record(user, tacho, result);
    let saved = api.create_deteccion(&record, detection_image(image)?).await?;
    info!(
        deteccion_id = saved.id,
        tacho = ?record.tacho,
        clasificacion = %record.clasificacion,
        "Detection saved"
    );

    if let Some(tacho) = tacho {
        if let Err(e) = api.notify_iot(tacho.id, record.clasificacion).await {
            warn!(tacho_id = tacho.id, error = %e, "IoT notification failed");
        }
    }

    Ok(saved)
}

impl DetectionWorkflow {
    /// Save the displayed classification for the session's user.
    ///
    /// Saving without a bin is only allowed for users who own none.
    pub async fn save(&self, api: &ApiClient, tacho: Option<&Tacho>) -> DetectResult<Deteccion> {
        let user = api.session().current_user().ok_or(DetectError::NotLoggedIn)?;
        let result = self.result().ok_or(DetectError::NoResult)?;
        let image = self.image().ok_or(DetectError::NoImage)?;

        if tacho.is_none() {
            let owned = api.user_tachos(&user).await?;
            if !owned.is_empty() {
                debug!(usuario = user.id, owned = owned.len(), "Refusing to save without a bin");
                return Err(DetectError::TachoRequired);
            }
        }

        save_detection(api, &user, tacho, result, image).await
    }
}
