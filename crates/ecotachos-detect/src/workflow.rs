//! Detection panel state: image, status, current view.

use ecotachos_ai_client::{AiClient, AiHealth, DetectionOutcome, ImageInput, RetryPolicy};
use ecotachos_capture::{load_upload, CameraSession, EncodedImage, SelectedFile, UploadPolicy};
use ecotachos_models::ClassificationResult;
use tracing::{debug, info, warn};

use crate::error::{DetectError, DetectResult};
use crate::presentation::{present, ErrorView, Presentation, ProcessingStatus};

/// Identifies one classification request.
///
/// Only the ticket issued by the latest [`DetectionWorkflow::begin`] is
/// current; results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// A request issued by [`DetectionWorkflow::begin`].
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub ticket: Ticket,
    pub image: ImageInput,
}

/// State of the detection panel.
#[derive(Debug, Default)]
pub struct DetectionWorkflow {
    status: ProcessingStatus,
    image: Option<ImageInput>,
    presentation: Option<Presentation>,
    result: Option<ClassificationResult>,
    generation: u64,
    health: Option<AiHealth>,
}

impl DetectionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn image(&self) -> Option<&ImageInput> {
        self.image.as_ref()
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    /// Last successful classification, if the panel shows one.
    pub fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    pub fn health(&self) -> Option<&AiHealth> {
        self.health.as_ref()
    }

    /// Record the inference engine's health, used by the pre-check.
    pub fn set_health(&mut self, health: AiHealth) {
        if health.missing_weights() {
            warn!(engine = ?health.engine, "Local engine reports missing weights");
        }
        self.health = Some(health);
    }

    /// Replace the current image. Any displayed or in-flight result is
    /// discarded.
    pub fn set_image(&mut self, image: impl Into<ImageInput>) {
        self.clear_results();
        self.image = Some(image.into());
        self.status = ProcessingStatus::Ready;
    }

    /// Take a still from an active camera session.
    ///
    /// The session is consumed and its stream released either way.
    pub fn capture(&mut self, session: CameraSession) -> DetectResult<()> {
        match session.capture_still() {
            Ok(image) => {
                self.set_image(image);
                Ok(())
            }
            Err(e) => {
                self.show_error(ErrorView::from_capture(&e));
                Err(e.into())
            }
        }
    }

    /// Validate and load a user-selected file.
    ///
    /// A rejected file leaves the previous image in place and shows the
    /// validation message.
    pub fn load_file(&mut self, file: &SelectedFile, policy: &UploadPolicy) -> DetectResult<()> {
        match load_upload(file, policy) {
            Ok(image) => {
                debug!(file = %file.name, size = file.size(), "Upload accepted");
                self.set_image(image);
                Ok(())
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "Upload rejected");
                self.show_error(ErrorView::from_capture(&e));
                Err(e.into())
            }
        }
    }

    /// Start a classification.
    ///
    /// Fails without issuing a ticket when there is no image or the local
    /// engine has no weights; the panel then shows the matching error.
    pub fn begin(&mut self) -> DetectResult<DetectionRequest> {
        let Some(image) = self.image.clone() else {
            self.show_error(ErrorView::no_image());
            return Err(DetectError::NoImage);
        };
        if self.health.as_ref().is_some_and(AiHealth::missing_weights) {
            self.show_error(ErrorView::missing_weights());
            return Err(DetectError::MissingWeights);
        }

        self.generation += 1;
        self.status = ProcessingStatus::Processing;
        self.presentation = None;
        self.result = None;

        Ok(DetectionRequest {
            ticket: Ticket(self.generation),
            image,
        })
    }

    /// Apply the outcome of a request.
    ///
    /// Returns `false`, leaving the state untouched, when `ticket` is no
    /// longer current.
    pub fn finish(&mut self, ticket: Ticket, outcome: DetectionOutcome) -> bool {
        if ticket.0 != self.generation || self.status != ProcessingStatus::Processing {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Dropping stale detection outcome"
            );
            return false;
        }

        let presentation = present(&outcome);
        self.status = presentation.status();
        self.presentation = Some(presentation);
        if let DetectionOutcome::Classified(result) = outcome {
            info!(
                categoria = %result.category(),
                confianza = result.confidence(),
                "Detection complete"
            );
            self.result = Some(result);
        }
        true
    }

    /// Back to an empty panel. In-flight results are dropped.
    pub fn reset(&mut self) {
        self.clear_results();
        self.image = None;
        self.status = ProcessingStatus::Ready;
    }

    /// Run one classification end to end.
    pub async fn classify(
        &mut self,
        ai: &AiClient,
        retry: Option<&RetryPolicy>,
    ) -> DetectResult<&Presentation> {
        let request = self.begin()?;
        let outcome = match retry {
            Some(policy) => ai.detect_with_retry(&request.image, policy).await,
            None => ai.detect(&request.image).await,
        };
        self.finish(request.ticket, outcome);
        self.presentation.as_ref().ok_or(DetectError::NoResult)
    }

    fn show_error(&mut self, view: ErrorView) {
        self.result = None;
        self.status = ProcessingStatus::Error;
        self.presentation = Some(Presentation::Error(view));
    }

    fn clear_results(&mut self) {
        self.generation += 1;
        self.presentation = None;
        self.result = None;
    }
}

/// Encoded form of an image, for callers that need a data URL.
pub fn as_encoded(image: &ImageInput) -> EncodedImage {
    match image {
        ImageInput::DataUrl(encoded) => encoded.clone(),
        ImageInput::File { mime, bytes, .. } => EncodedImage::from_bytes(mime, bytes),
    }
}
