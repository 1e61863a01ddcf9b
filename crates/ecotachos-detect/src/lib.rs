//! Detection workflow for the EcoTachos client.
//!
//! Ties image acquisition, the inference call and the backend together:
//! - [`DetectionWorkflow`] tracks the panel status and drops stale results
//! - [`present`] maps a [`DetectionOutcome`](ecotachos_ai_client::DetectionOutcome) to what the user sees
//! - [`save_detection`] records a classification and notifies the bin

pub mod error;
pub mod presentation;
pub mod save;
pub mod workflow;

pub use error::{DetectError, DetectResult};
pub use presentation::{
    format_confidence, present, AlternativeView, ErrorKind, ErrorView, Presentation,
    ProcessingStatus, ResultView,
};
pub use save::{build_record, detection_image, save_detection};
pub use workflow::{as_encoded, DetectionRequest, DetectionWorkflow, Ticket};
