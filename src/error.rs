//! Error types for voicepipe

use thiserror::Error;

/// Result type alias for voicepipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in voicepipe
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Container declares a sample encoding the engine cannot play
    #[error("unsupported audio format: {sample_width}-byte {sample_format} samples")]
    UnsupportedFormat {
        /// Bytes per sample as declared by the container
        sample_width: u16,
        /// Declared sample encoding ("int" or "float")
        sample_format: &'static str,
    },

    /// Container declares more frames than the input actually carries
    #[error("truncated audio input: header declares {expected} samples, {actual} present")]
    TruncatedInput {
        /// Sample count declared by the container header
        expected: usize,
        /// Sample count actually readable from the input
        actual: usize,
    },

    /// Container decodes to zero frames
    ///
    /// Callers should treat this as a successful no-op, not a user-facing
    /// failure; silent synthesis is valid degenerate input.
    #[error("empty audio: container holds no frames")]
    EmptyAudio,

    /// Malformed container (bad header, not a WAV)
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Output device could not be opened or started
    #[error("audio device error: {0}")]
    DeviceOpen(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
