//! Media types and provider traits.

use async_trait::async_trait;

/// Image description request.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g. "image/jpeg").
    pub mime_type: String,
    /// Prompt for description.
    pub prompt: String,
}

/// Image description result.
#[derive(Debug, Clone)]
pub struct ImageResult {
    /// Generated description.
    pub description: String,
}

/// Trait for remote image description providers.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &str;
    /// Describe an image in one complete (non-streaming) call.
    async fn describe_image(&self, req: ImageRequest) -> anyhow::Result<ImageResult>;
}

/// Trait for speech playback backends.
///
/// `speak` has enqueue semantics: it returns once playback has been
/// started, not once it has finished, and never cancels a prior
/// unfinished utterance.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizer identifier.
    fn id(&self) -> &str;
    /// Enqueue the given text for playback.
    async fn speak(&self, text: &str) -> anyhow::Result<()>;
}
