//! Image acquisition for waste classification.
//!
//! Two paths produce the same [`EncodedImage`]:
//! - a live camera stream, captured once through a [`CameraSession`]
//! - a user-selected file, checked against an [`UploadPolicy`]

pub mod camera;
pub mod encoded;
pub mod error;
pub mod upload;

pub use camera::{CameraDevice, CameraSession, Facing, FrameSource, MediaStream};
pub use encoded::{is_data_url, EncodedImage};
pub use error::{CaptureError, CaptureResult};
pub use upload::{load_upload, validate_upload, SelectedFile, UploadPolicy};
