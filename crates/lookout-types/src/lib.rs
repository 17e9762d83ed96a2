use serde::{Deserialize, Serialize};

// ──────────────────── Device Types ────────────────────

/// A video input device as reported by the platform backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Platform device identifier (string form of the camera index).
    pub id: String,
    /// Human-readable label, or a generated "Camera N" fallback.
    pub label: String,
}

// ──────────────────── Capture Types ────────────────────

/// A single encoded snapshot of the live video stream.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// MIME type of the encoding (e.g. "image/jpeg").
    pub mime_type: String,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
}

// ──────────────────── Request State ────────────────────

/// Lifecycle of the capture-and-describe pipeline.
///
/// `InFlight` is entered only after the credential and client-construction
/// checks pass, and is always left on completion, success or failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// No request has run yet, or the last one was reset.
    Idle,
    /// A request is currently active; further triggers are no-ops.
    InFlight,
    /// The last request ended in an error.
    Failed,
    /// The last request completed and its text was presented.
    Succeeded,
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }
}

/// Outcome of a single trigger of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A request was already in flight; nothing happened.
    Busy,
    /// The credential was empty after trimming; no network call was made.
    MissingCredential,
    /// The pipeline ran to completion (the final state tells success/failure).
    Completed(RequestState),
}
