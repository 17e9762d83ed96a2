//! lookout-camera: Video device enumeration and snapshot capture.

use thiserror::Error;

pub mod capture;
pub mod devices;
pub mod raster;

pub use capture::{CameraBinder, FrameSource};
pub use devices::list_devices;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Device enumeration failed: {0}")]
    Enumerate(#[source] nokhwa::NokhwaError),
    #[error("Failed to open device {id}: {source}")]
    Open {
        id: String,
        #[source]
        source: nokhwa::NokhwaError,
    },
    #[error("Frame capture failed: {0}")]
    Capture(#[source] nokhwa::NokhwaError),
    #[error("JPEG encode failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Frame buffer does not match its reported dimensions")]
    InvalidFrame,
    #[error("No camera is bound")]
    NotBound,
}
