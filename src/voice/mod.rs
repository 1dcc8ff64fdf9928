//! Voice processing module
//!
//! The streaming playback engine: WAV container decoding, sample
//! normalization, the pull-based playback session, and the start/stop/wait
//! controller. TTS synthesis is the one external call this module makes.

pub mod container;
pub mod normalize;
mod playback;
mod session;
mod tts;
mod wav;

pub use container::{AudioContainer, RawSamples, decode};
pub use normalize::{NormalizedBuffer, normalize};
pub use playback::{AudioPlayback, SessionHandle};
pub use session::{BlockSource, PlaybackOutcome};
pub use tts::TextToSpeech;
pub use wav::samples_to_wav;

use crate::Result;

/// Synthesize text and play it to completion
///
/// Mirrors the assistant's respond-then-speak turn: one TTS request, one
/// playback session, blocking until the clip finishes or is stopped.
///
/// # Errors
///
/// Returns error if synthesis fails or the output stream cannot be opened.
pub async fn speak(
    playback: &AudioPlayback,
    tts: &TextToSpeech,
    text: &str,
) -> Result<PlaybackOutcome> {
    let audio = tts.synthesize(text).await?;
    let handle = playback.start(&audio)?;
    Ok(handle.wait())
}
