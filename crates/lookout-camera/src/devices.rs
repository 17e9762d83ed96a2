//! Video input device enumeration.

use nokhwa::query;
use nokhwa::utils::{ApiBackend, CameraIndex};

use lookout_types::DeviceDescriptor;

use crate::CameraError;

/// List the available video input devices in platform order.
///
/// A device without a usable platform label gets a generated `Camera N`
/// label, N being its 1-based position in the list. Zero devices is an
/// empty list, not an error.
pub fn list_devices() -> Result<Vec<DeviceDescriptor>, CameraError> {
    let cameras = query(ApiBackend::Auto).map_err(CameraError::Enumerate)?;
    tracing::debug!("Enumerated {} video input device(s)", cameras.len());

    Ok(cameras
        .iter()
        .enumerate()
        .map(|(position, info)| DeviceDescriptor {
            id: info.index().to_string(),
            label: display_label(&info.human_name(), position),
        })
        .collect())
}

/// Parse a device id back into a platform camera index.
///
/// Numeric ids address cameras by index; anything else is passed through
/// as a backend-specific string identifier.
pub(crate) fn device_index(id: &str) -> CameraIndex {
    match id.parse::<u32>() {
        Ok(n) => CameraIndex::Index(n),
        Err(_) => CameraIndex::String(id.to_string()),
    }
}

fn display_label(platform_label: &str, position: usize) -> String {
    let trimmed = platform_label.trim();
    if trimmed.is_empty() {
        format!("Camera {}", position + 1)
    } else {
        trimmed.to_string()
    }
}
