use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// Camera capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Device id to bind at startup (first enumerated device if None).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Raster width the snapshot is stretched to.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Raster height the snapshot is stretched to.
    #[serde(default = "default_height")]
    pub height: u32,
    /// JPEG quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_jpeg_quality() -> u8 {
    85
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            width: default_width(),
            height: default_height(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Remote vision service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Model identifier for the describe call.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key (flag and GEMINI_API_KEY env take precedence).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Whether responses are spoken aloud.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Engine binary override (auto-detected if None).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Voice identifier passed to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: None,
            voice: None,
        }
    }
}

/// Top-level lookout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookoutConfig {
    /// Camera capture config.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Remote vision service config.
    #[serde(default)]
    pub vision: VisionConfig,
    /// Speech synthesis config.
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Default prompt sent with each snapshot.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_prompt() -> String {
    "What do you see in this picture? Describe in detail, along with reasoning.".to_string()
}

impl Default for LookoutConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            vision: VisionConfig::default(),
            speech: SpeechConfig::default(),
            prompt: default_prompt(),
        }
    }
}

/// Resolve the vision API key: explicit flag > config > GEMINI_API_KEY env.
///
/// Returns an empty string when no source provides a key; the pipeline's
/// credential check treats that as a missing key.
pub fn resolve_api_key(flag: Option<String>, config: &LookoutConfig) -> String {
    flag.or_else(|| config.vision.api_key.clone())
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .unwrap_or_default()
}

/// Resolve the lookout config directory (~/.lookout/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".lookout"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.lookout/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
pub fn load_config() -> Result<LookoutConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    load_config_from(&path)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<LookoutConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(LookoutConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: LookoutConfig = json5::from_str(&content)?;
    Ok(config)
}

/// Ensure the config directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = config_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Save configuration to the default path.
pub fn save_config(config: &LookoutConfig) -> Result<(), ConfigError> {
    let dir = ensure_config_dir()?;
    let path = dir.join("config.json5");
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
