//! WAV encoding helper

use crate::{Error, Result};

/// Convert f32 samples to 16-bit WAV bytes
///
/// `samples` is interleaved channel-minor; its length must be a multiple of
/// `channels`. Used by tests to construct playable clips and by capture-side
/// collaborators that ship audio to STT APIs.
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Decode(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Decode(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Decode(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
