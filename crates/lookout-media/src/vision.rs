//! Image description providers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{ImageRequest, ImageResult, VisionProvider};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini image description provider.
pub struct GeminiVisionProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiVisionProvider {
    /// Build a provider from a credential.
    ///
    /// The HTTP client carries the request timeout, so a hung remote call
    /// surfaces as an ordinary failure instead of blocking forever.
    pub fn new(api_key: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            client,
        })
    }
}

fn build_request_body(req: &ImageRequest) -> Value {
    let base64_data = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &req.data);

    serde_json::json!({
        "contents": [{
            "parts": [
                {
                    "text": req.prompt
                },
                {
                    "inline_data": {
                        "mime_type": req.mime_type,
                        "data": base64_data
                    }
                }
            ]
        }]
    })
}

fn extract_text(json: &Value) -> Option<String> {
    json.pointer("/candidates/0/content/parts/0/text")
        .and_then(|t| t.as_str())
        .map(String::from)
}

fn error_message(json: &Value) -> &str {
    json.pointer("/error/message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
}

#[async_trait]
impl VisionProvider for GeminiVisionProvider {
    fn id(&self) -> &str {
        "gemini-vision"
    }

    async fn describe_image(&self, req: ImageRequest) -> anyhow::Result<ImageResult> {
        let body = build_request_body(&req);
        let url = format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let json: Value = resp.json().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!("Vision API error: {}", error_message(&json)));
        }

        let description = extract_text(&json)
            .ok_or_else(|| anyhow::anyhow!("Vision API response contained no text"))?;

        Ok(ImageResult { description })
    }
}
