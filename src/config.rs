//! Configuration for voicepipe
//!
//! All engine tuning is explicit configuration passed to the controller;
//! nothing is read from process-wide environment state inside the engine.

use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback engine configuration
    pub playback: PlaybackConfig,

    /// TTS provider configuration
    pub tts: TtsConfig,
}

impl Config {
    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }
}

/// Playback engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Output device name; `None` selects the host default
    pub device: Option<String>,

    /// Override the stream sample rate instead of using the clip's rate
    pub sample_rate_override: Option<u32>,

    /// Callback block duration in milliseconds
    ///
    /// Trades cancellation latency against callback overhead. The device may
    /// still adjust the requested buffer size.
    pub block_ms: u64,

    /// Supervisor poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate_override: None,
            block_ms: 50,
            poll_interval_ms: 100,
        }
    }
}

/// TTS provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// TTS model (e.g. "tts-1")
    pub model: String,

    /// TTS voice identifier
    pub voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub speed: f32,

    /// `OpenAI` API key
    pub api_key: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model: "tts-1".to_string(),
            voice: "nova".to_string(),
            speed: 1.0,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn defaults_match_reference_tuning() {
        let config = Config::default();
        assert_eq!(config.playback.block_ms, 50);
        assert_eq!(config.playback.poll_interval_ms, 100);
        assert!(config.playback.device.is_none());
        assert_eq!(config.tts.model, "tts-1");
        assert_eq!(config.tts.voice, "nova");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [playback]
            block_ms = 20

            [tts]
            voice = "alloy"
            "#,
        )
        .unwrap();
        assert_eq!(config.playback.block_ms, 20);
        assert_eq!(config.playback.poll_interval_ms, 100);
        assert_eq!(config.tts.voice, "alloy");
        assert_eq!(config.tts.model, "tts-1");
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(Config::from_toml("[playback").is_err());
    }
}
