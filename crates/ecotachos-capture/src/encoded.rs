//! In-memory encoded image, normalized to a data URL.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{CaptureError, CaptureResult};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A still image as `data:<mime>;base64,<payload>`.
///
/// Both capture paths (camera and upload) produce this representation.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data_url: String,
    /// Byte offset of the payload inside `data_url`
    payload_start: usize,
}

impl EncodedImage {
    /// Encode raw bytes of the given MIME type.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let header = format!("{}{}{}", DATA_URL_PREFIX, mime, BASE64_MARKER);
        let payload_start = header.len();
        let mut data_url = header;
        STANDARD.encode_string(bytes, &mut data_url);
        Self {
            data_url,
            payload_start,
        }
    }

    /// Parse an existing data URL. Only base64 `image/*` URLs are accepted.
    pub fn from_data_url(data_url: impl Into<String>) -> CaptureResult<Self> {
        let data_url = data_url.into();

        if !data_url.starts_with("data:image/") {
            return Err(CaptureError::InvalidDataUrl("expected data:image/ prefix".into()));
        }
        let marker = data_url
            .find(BASE64_MARKER)
            .ok_or_else(|| CaptureError::InvalidDataUrl("missing ;base64, marker".into()))?;

        Ok(Self {
            payload_start: marker + BASE64_MARKER.len(),
            data_url,
        })
    }

    /// The full data URL.
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }

    /// MIME type from the header, e.g. `image/jpeg`.
    pub fn mime_type(&self) -> &str {
        let header = &self.data_url[DATA_URL_PREFIX.len()..self.payload_start - BASE64_MARKER.len()];
        // Parameters such as `;charset=` may sit between type and marker.
        header.split(';').next().unwrap_or(header)
    }

    /// Base64 payload without the header.
    pub fn payload(&self) -> &str {
        &self.data_url[self.payload_start..]
    }

    /// Decode the payload back to bytes.
    pub fn decode(&self) -> CaptureResult<Vec<u8>> {
        Ok(STANDARD.decode(self.payload())?)
    }

    /// File extension matching the MIME type, used when the image is sent
    /// as a multipart file.
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            _ => "jpg",
        }
    }
}

/// Whether a string looks like a base64 image data URL.
pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:image/") && value.contains(BASE64_MARKER)
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime_type())
            .field("payload_len", &self.payload().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_roundtrip_header() {
        let img = EncodedImage::from_bytes("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(img.as_data_url().starts_with("data:image/png;base64,"));
        assert_eq!(img.mime_type(), "image/png");
        assert_eq!(img.decode().unwrap(), vec![0x89, b'P', b'N', b'G']);
        assert_eq!(img.file_extension(), "png");
    }

    #[test]
    fn test_from_data_url_rejects_non_image() {
        let err = EncodedImage::from_data_url("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidDataUrl(_)));

        let err = EncodedImage::from_data_url("data:image/png,raw").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidDataUrl(_)));
    }

    #[test]
    fn test_is_data_url() {
        assert!(is_data_url("data:image/png;base64,AAAA"));
        assert!(!is_data_url("/tmp/foto.png"));
    }

    #[test]
    fn test_mime_with_parameters() {
        let img = EncodedImage::from_data_url("data:image/jpeg;name=x.jpg;base64,AAAA").unwrap();
        assert_eq!(img.mime_type(), "image/jpeg");
        assert_eq!(img.payload(), "AAAA");
        assert_eq!(img.file_extension(), "jpg");
    }

    #[test]
    fn test_debug_hides_payload() {
        let img = EncodedImage::from_bytes("image/jpeg", &[1, 2, 3]);
        let debug = format!("{:?}", img);
        assert!(debug.contains("image/jpeg"));
        assert!(!debug.contains("base64"));
    }
}
