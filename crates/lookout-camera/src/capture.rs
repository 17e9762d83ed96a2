//! Live camera binding and snapshot capture.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use lookout_types::CaptureFrame;

use crate::devices::device_index;
use crate::raster;
use crate::CameraError;

/// Source of encoded snapshot frames.
///
/// Abstracts the live camera so the capture pipeline can be driven by a
/// test double. Binding is by device id; a failed bind must leave any
/// previous binding in place.
pub trait FrameSource {
    /// Bind the source to the given device, replacing the current binding
    /// only on success.
    fn bind(&mut self, device_id: &str) -> Result<(), CameraError>;

    /// The id of the currently bound device, if any.
    fn bound_device(&self) -> Option<&str>;

    /// Grab the current frame as an encoded snapshot.
    fn snapshot(&mut self) -> Result<CaptureFrame, CameraError>;
}

struct BoundCamera {
    id: String,
    inner: Camera,
}

/// Binds one camera at a time and produces fixed-size JPEG snapshots.
///
/// The snapshot raster size and JPEG quality are fixed at construction;
/// every snapshot is stretched to that size regardless of the source
/// frame's dimensions.
pub struct CameraBinder {
    raster_width: u32,
    raster_height: u32,
    jpeg_quality: u8,
    bound: Option<BoundCamera>,
}

impl CameraBinder {
    pub fn new(raster_width: u32, raster_height: u32, jpeg_quality: u8) -> Self {
        Self {
            raster_width,
            raster_height,
            jpeg_quality,
            bound: None,
        }
    }
}

impl FrameSource for CameraBinder {
    fn bind(&mut self, device_id: &str) -> Result<(), CameraError> {
        let index = device_index(device_id);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = Camera::new(index, requested).map_err(|source| CameraError::Open {
            id: device_id.to_string(),
            source,
        })?;
        camera.open_stream().map_err(|source| CameraError::Open {
            id: device_id.to_string(),
            source,
        })?;

        tracing::info!("Bound camera device {device_id}");
        // The previous binding is replaced only once the new stream is up.
        self.bound = Some(BoundCamera {
            id: device_id.to_string(),
            inner: camera,
        });
        Ok(())
    }

    fn bound_device(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.id.as_str())
    }

    fn snapshot(&mut self) -> Result<CaptureFrame, CameraError> {
        let bound = self.bound.as_mut().ok_or(CameraError::NotBound)?;
        let buffer = bound.inner.frame().map_err(CameraError::Capture)?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(CameraError::Capture)?;

        let (src_width, src_height) = (decoded.width(), decoded.height());
        raster::encode_jpeg_stretched(
            decoded.into_raw(),
            src_width,
            src_height,
            self.raster_width,
            self.raster_height,
            self.jpeg_quality,
        )
    }
}
