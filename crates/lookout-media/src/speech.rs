//! Speech synthesis backends.

use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;

use crate::types::SpeechSynthesizer;

/// Platform speech engines probed in order when no override is configured.
const ENGINE_CANDIDATES: &[&str] = &["say", "espeak-ng", "espeak", "spd-say"];

/// Speech synthesis via a platform CLI engine.
///
/// Each `speak` call spawns the engine and returns without awaiting
/// playback, so rapid calls can queue overlapping utterances.
pub struct CommandSynthesizer {
    engine: String,
    voice: Option<String>,
}

impl CommandSynthesizer {
    /// Build a synthesizer, auto-detecting an engine on PATH unless one is
    /// configured explicitly.
    pub fn new(engine_override: Option<String>, voice: Option<String>) -> anyhow::Result<Self> {
        let engine = match engine_override {
            Some(engine) => engine,
            None => detect_engine().ok_or_else(|| {
                anyhow::anyhow!(
                    "No speech engine found on PATH (tried {})",
                    ENGINE_CANDIDATES.join(", ")
                )
            })?,
        };
        Ok(Self { engine, voice })
    }
}

fn detect_engine() -> Option<String> {
    ENGINE_CANDIDATES
        .iter()
        .find(|bin| engine_available(bin))
        .map(|s| s.to_string())
}

fn engine_available(bin: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(bin).is_file())
}

/// Engine arguments ahead of the text argument.
fn voice_args(engine: &str, voice: Option<&str>) -> Vec<String> {
    let Some(voice) = voice else {
        return Vec::new();
    };
    let engine_name = std::path::Path::new(engine)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(engine);
    match engine_name {
        "say" | "espeak-ng" | "espeak" => vec!["-v".into(), voice.into()],
        "spd-say" => vec!["-t".into(), voice.into()],
        _ => Vec::new(),
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn id(&self) -> &str {
        "command-speech"
    }

    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        let mut child = tokio::process::Command::new(&self.engine)
            .args(voice_args(&self.engine, self.voice.as_deref()))
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start speech engine {}", self.engine))?;

        let engine = self.engine.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!("Speech engine {engine} exited with {status}");
                }
                Err(e) => tracing::warn!("Speech engine {engine} wait failed: {e}"),
                Ok(_) => {}
            }
        });
        Ok(())
    }
}

/// No-op synthesizer for disabled speech.
pub struct NullSynthesizer;

#[async_trait]
impl SpeechSynthesizer for NullSynthesizer {
    fn id(&self) -> &str {
        "null-speech"
    }

    async fn speak(&self, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_available_rejects_missing_binary() {
        assert!(!engine_available("lookout-no-such-speech-engine"));
    }

    #[test]
    fn test_voice_args_per_engine() {
        assert_eq!(
            voice_args("say", Some("Samantha")),
            vec!["-v".to_string(), "Samantha".to_string()]
        );
        assert_eq!(
            voice_args("/usr/bin/espeak-ng", Some("en-gb")),
            vec!["-v".to_string(), "en-gb".to_string()]
        );
        assert_eq!(
            voice_args("spd-say", Some("female1")),
            vec!["-t".to_string(), "female1".to_string()]
        );
        assert!(voice_args("say", None).is_empty());
        assert!(voice_args("some-custom-engine", Some("x")).is_empty());
    }

    #[tokio::test]
    async fn test_null_synthesizer_accepts_text() {
        let synth = NullSynthesizer;
        assert_eq!(synth.id(), "null-speech");
        synth.speak("hello").await.unwrap();
    }
}
