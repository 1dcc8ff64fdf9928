//! Voicepipe - streaming speech playback engine for voice assistants
//!
//! This library provides the audio side of a voice assistant's reply turn:
//! - WAV container decoding and f32 sample normalization
//! - A pull-based playback session with bounded-latency cancellation
//! - A start/stop/wait controller serializing one session at a time
//! - A TTS client producing clips the engine plays directly
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              External collaborators                  │
//! │   STT  │  LLM routing  │  command glue  │  ...      │
//! └────────────────────┬────────────────────────────────┘
//!                      │ "play these bytes" / "stop now"
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Voicepipe                           │
//! │   decode  →  normalize  →  session  →  controller   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ 50 ms blocks, pull callback
//! ┌────────────────────▼────────────────────────────────┐
//! │              Output device (cpal)                    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod voice;

pub use config::{Config, PlaybackConfig, TtsConfig};
pub use error::{Error, Result};
pub use voice::{
    AudioContainer, AudioPlayback, BlockSource, NormalizedBuffer, PlaybackOutcome, RawSamples,
    SessionHandle, TextToSpeech, samples_to_wav, speak,
};
