//! Synthesized-speech container decoding
//!
//! TTS providers hand the engine a complete WAV clip in memory. This module
//! parses the container header, validates the declared layout against the
//! bytes actually present, and yields the raw interleaved integer samples for
//! normalization.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use crate::{Error, Result};

/// Raw interleaved integer samples, as declared by the container
#[derive(Debug, Clone)]
pub enum RawSamples {
    /// 2-byte signed samples
    Int16(Vec<i16>),
    /// 4-byte signed samples
    Int32(Vec<i32>),
}

impl RawSamples {
    /// Number of individual samples across all channels
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int16(s) => s.len(),
            Self::Int32(s) => s.len(),
        }
    }

    /// Whether the container holds no samples at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded audio container: declared layout plus raw samples
///
/// Immutable once decoded; consumed by [`crate::voice::normalize`].
#[derive(Debug, Clone)]
pub struct AudioContainer {
    channels: u16,
    sample_width: u16,
    sample_rate: u32,
    samples: RawSamples,
}

impl AudioContainer {
    /// Declared channel count
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Bytes per sample (2 or 4)
    #[must_use]
    pub const fn sample_width(&self) -> u16 {
        self.sample_width
    }

    /// Declared sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raw interleaved samples
    #[must_use]
    pub const fn samples(&self) -> &RawSamples {
        &self.samples
    }

    /// Number of frames (one sample per channel)
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Total size of the raw sample data in bytes
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.samples.len() * usize::from(self.sample_width)
    }

    /// Consume the container, yielding its raw samples
    #[must_use]
    pub fn into_samples(self) -> RawSamples {
        self.samples
    }
}

/// Decode an in-memory WAV clip into an [`AudioContainer`]
///
/// Pure transformation: no device or file access.
///
/// # Errors
///
/// Returns [`Error::Decode`] when the header is not valid WAV,
/// [`Error::UnsupportedFormat`] when samples are not 16-bit or 32-bit signed
/// integers, and [`Error::TruncatedInput`] when the header declares more
/// samples than the input carries.
#[allow(clippy::cast_possible_truncation)]
pub fn decode(bytes: &[u8]) -> Result<AudioContainer> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| Error::Decode(e.to_string()))?;
    let spec = reader.spec();
    let declared = reader.len() as usize;

    if spec.channels == 0 {
        return Err(Error::Decode("container declares zero channels".to_string()));
    }

    if spec.sample_format == SampleFormat::Float {
        return Err(Error::UnsupportedFormat {
            sample_width: spec.bits_per_sample / 8,
            sample_format: "float",
        });
    }

    let samples = match spec.bits_per_sample {
        16 => RawSamples::Int16(read_all(reader.samples::<i16>(), declared)?),
        32 => RawSamples::Int32(read_all(reader.samples::<i32>(), declared)?),
        bits => {
            return Err(Error::UnsupportedFormat {
                sample_width: bits / 8,
                sample_format: "int",
            });
        }
    };

    if samples.len() % usize::from(spec.channels) != 0 {
        return Err(Error::Decode(format!(
            "sample count {} not aligned to {} channels",
            samples.len(),
            spec.channels
        )));
    }

    tracing::debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        samples = samples.len(),
        "decoded audio container"
    );

    Ok(AudioContainer {
        channels: spec.channels,
        sample_width: spec.bits_per_sample / 8,
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Collect every declared sample, mapping a short read to `TruncatedInput`
fn read_all<S, I>(iter: I, declared: usize) -> Result<Vec<S>>
where
    I: Iterator<Item = hound::Result<S>>,
{
    let mut samples = Vec::with_capacity(declared);
    for sample in iter {
        match sample {
            Ok(s) => samples.push(s),
            Err(_) => {
                return Err(Error::TruncatedInput {
                    expected: declared,
                    actual: samples.len(),
                });
            }
        }
    }
    if samples.len() < declared {
        return Err(Error::TruncatedInput {
            expected: declared,
            actual: samples.len(),
        });
    }
    Ok(samples)
}
