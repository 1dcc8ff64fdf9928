//! Sample normalization to canonical f32
//!
//! Output devices are driven with f32 frames in `[-1.0, 1.0]`; this module
//! converts a decoded container's raw integer samples into that range.

use crate::voice::container::{AudioContainer, RawSamples};
use crate::{Error, Result};

/// Normalized interleaved samples, shared read-only with the device callback
///
/// Samples are stored flat in channel-minor order; frame `i` occupies
/// `[i * channels, (i + 1) * channels)`.
#[derive(Debug, Clone)]
pub struct NormalizedBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl NormalizedBuffer {
    /// Zero-frame buffer backing a no-op session
    pub(crate) const fn empty() -> Self {
        Self {
            samples: Vec::new(),
            channels: 1,
            sample_rate: 0,
        }
    }

    /// Channel count (interleave stride)
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz, carried over from the container
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Flat interleaved sample view
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// One frame: a `channels`-sized slice at the given frame index
    ///
    /// # Panics
    ///
    /// Panics if `frame` is out of range.
    #[must_use]
    pub fn frame(&self, frame: usize) -> &[f32] {
        let stride = usize::from(self.channels);
        &self.samples[frame * stride..(frame + 1) * stride]
    }
}

/// Convert raw integer samples to f32 in `[-1.0, 1.0]`
///
/// 16-bit samples divide by 32768, 32-bit by 2147483648, so the most negative
/// representable value maps exactly to -1.0.
///
/// # Errors
///
/// Returns [`Error::EmptyAudio`] when the container holds zero frames.
/// Callers should treat that as a successful no-op.
pub fn normalize(container: AudioContainer) -> Result<NormalizedBuffer> {
    if container.frame_count() == 0 {
        return Err(Error::EmptyAudio);
    }

    let channels = container.channels();
    let sample_rate = container.sample_rate();

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = match container.into_samples() {
        RawSamples::Int16(raw) => raw.iter().map(|&s| f32::from(s) / 32768.0).collect(),
        RawSamples::Int32(raw) => raw
            .iter()
            .map(|&s| s as f32 / 2_147_483_648.0)
            .collect(),
    };

    Ok(NormalizedBuffer {
        samples,
        channels,
        sample_rate,
    })
}
