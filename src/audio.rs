//! WAV encoding and waveform helpers.
//!
//! Output format is fixed: canonical 44-byte header, 16-bit PCM, mono,
//! little-endian. Floats are clamped to [-1, 1] and scaled by `i16::MAX`.
//! 16-bit integer PCM is used instead of IEEE-float WAV because common
//! mobile media players accept float headers but play silence.

use std::{io::Cursor, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::Result;

fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Convert one float sample to 16-bit PCM: clamp to [-1, 1], then scale by
/// `i16::MAX`. Clamping happens on the float so full negative deflection is
/// `-32767`, symmetric with the positive rail.
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode samples as a complete in-memory WAV file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(f32_to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Write samples to a WAV file on disk.
pub fn write_wav(samples: &[f32], path: &Path, sample_rate: u32) -> Result<()> {
    let mut writer = WavWriter::create(path, wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(f32_to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

/// Waveform level summary, logged after synthesis for quick sanity checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioStats {
    pub min: f32,
    pub max: f32,
    pub mean_abs: f32,
    pub samples: usize,
}

pub fn stats(samples: &[f32]) -> AudioStats {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum_abs = 0.0f64;
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
        sum_abs += s.abs() as f64;
    }
    if samples.is_empty() {
        min = 0.0;
        max = 0.0;
    }
    AudioStats {
        min,
        max,
        mean_abs: if samples.is_empty() { 0.0 } else { (sum_abs / samples.len() as f64) as f32 },
        samples: samples.len(),
    }
}
