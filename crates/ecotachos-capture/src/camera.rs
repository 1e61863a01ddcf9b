//! Camera path: a scoped stream session that captures one still.
//!
//! The platform camera is abstracted behind [`FrameSource`] and
//! [`MediaStream`]. A [`CameraSession`] owns the open stream and stops it
//! on capture, on reset and on drop, so the device is never left running.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use tracing::{debug, info, warn};

use crate::encoded::EncodedImage;
use crate::error::{CaptureError, CaptureResult};

/// JPEG quality used for captured stills.
pub const JPEG_QUALITY: u8 = 90;

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, preferred for photographing waste
    #[default]
    Environment,
    /// Front camera; frames are mirrored before encoding
    User,
}

/// A video input known to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
}

/// An open camera stream.
#[cfg_attr(test, mockall::automock)]
pub trait MediaStream: Send {
    /// Grab the current frame.
    fn grab_frame(&mut self) -> CaptureResult<RgbImage>;

    /// Facing actually granted by the platform.
    fn facing(&self) -> Facing;

    /// Stop all tracks.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Enumerates and opens cameras.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource: Send {
    fn devices(&self) -> CaptureResult<Vec<CameraDevice>>;

    fn open(&mut self, device: &CameraDevice, facing: Facing) -> CaptureResult<Box<dyn MediaStream>>;
}

/// Scoped ownership of an open camera stream.
pub struct CameraSession {
    stream: Option<Box<dyn MediaStream>>,
    device: CameraDevice,
}

impl CameraSession {
    /// Open the first available camera with the requested facing.
    pub fn start(source: &mut dyn FrameSource, facing: Facing) -> CaptureResult<Self> {
        let devices = source.devices()?;
        let device = devices.into_iter().next().ok_or(CaptureError::NoCamera)?;

        let stream = source.open(&device, facing).map_err(|e| {
            warn!(device = %device.label, error = %e, "Failed to open camera");
            match e {
                CaptureError::CameraUnavailable(_) => e,
                other => CaptureError::CameraUnavailable(other.to_string()),
            }
        })?;

        info!(device = %device.label, ?facing, "Camera stream started");
        Ok(Self {
            stream: Some(stream),
            device,
        })
    }

    pub fn device(&self) -> &CameraDevice {
        &self.device
    }

    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    /// Grab one frame, encode it as JPEG and release the camera.
    ///
    /// The stream is stopped whether or not the grab succeeds.
    pub fn capture_still(mut self) -> CaptureResult<EncodedImage> {
        let result = self.grab_and_encode();
        self.release();
        result
    }

    /// Discard the session without capturing.
    pub fn reset(mut self) {
        self.release();
    }

    fn grab_and_encode(&mut self) -> CaptureResult<EncodedImage> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CaptureError::Frame("stream already released".into()))?;

        let mut frame = stream.grab_frame()?;
        if stream.facing() == Facing::User {
            imageops::flip_horizontal_in_place(&mut frame);
        }

        let jpeg = encode_jpeg(&frame)?;
        debug!(
            width = frame.width(),
            height = frame.height(),
            bytes = jpeg.len(),
            "Captured still"
        );
        Ok(EncodedImage::from_bytes("image/jpeg", &jpeg))
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if stream.is_active() {
                stream.stop();
                debug!(device = %self.device.label, "Camera stream stopped");
            }
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Encode an RGB frame as JPEG at [`JPEG_QUALITY`].
pub fn encode_jpeg(frame: &RgbImage) -> CaptureResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(frame)?;
    Ok(buf.into_inner())
}
