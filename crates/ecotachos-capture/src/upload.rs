//! Upload path: validate a user-selected file and encode it.

use std::path::Path;

use image::ImageFormat;
use tracing::debug;

use crate::encoded::EncodedImage;
use crate::error::{CaptureError, CaptureResult};

/// Default size ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Upload acceptance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Files strictly larger than this are rejected
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Create policy from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_bytes: std::env::var("UPLOAD_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

/// A file picked by the user.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Declared MIME type, as a browser would report it from the extension
    pub declared_mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, declared_mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_mime,
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "imagen".to_string());

        Ok(Self {
            declared_mime: declared_mime_for(path),
            name,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("declared_mime", &self.declared_mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// MIME type implied by a path's extension, if it names an image format.
pub fn declared_mime_for(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Check declared type then size. Rejected files never reach inference.
pub fn validate_upload(file: &SelectedFile, policy: &UploadPolicy) -> CaptureResult<()> {
    let is_image = file
        .declared_mime
        .as_deref()
        .is_some_and(|mime| mime.starts_with("image/"));
    if !is_image {
        return Err(CaptureError::InvalidFormat {
            declared: file.declared_mime.clone(),
        });
    }

    if file.size() > policy.max_bytes {
        return Err(CaptureError::TooLarge {
            size: file.size(),
            max: policy.max_bytes,
        });
    }

    Ok(())
}

/// Validate and encode an upload.
pub fn load_upload(file: &SelectedFile, policy: &UploadPolicy) -> CaptureResult<EncodedImage> {
    validate_upload(file, policy)?;

    let mime = file.declared_mime.as_deref().unwrap_or("image/jpeg");
    debug!(name = %file.name, mime, size = file.size(), "Encoding uploaded image");
    Ok(EncodedImage::from_bytes(mime, &file.bytes))
}
