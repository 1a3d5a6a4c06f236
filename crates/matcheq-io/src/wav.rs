//! WAV file reading and writing.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use matcheq_core::AudioBuffer;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

impl std::fmt::Display for WavFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pcm => write!(f, "PCM"),
            Self::IeeeFloat => write!(f, "IEEE float"),
        }
    }
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let num_frames = reader.duration() as u64;

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / spec.sample_rate as f64,
        format: spec.format,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (e.g., 16, 24, 32).
    pub bits_per_sample: u16,
    /// Integer or float samples.
    pub format: WavFormat,
}

impl WavSpec {
    /// 32-bit float, used for filter artifacts.
    pub fn float32(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: 32,
            format: WavFormat::IeeeFloat,
        }
    }

    /// 24-bit PCM, used for corrected deliverables.
    pub fn pcm24(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: 24,
            format: WavFormat::Pcm,
        }
    }
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::float32(1, 48000)
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            format: match spec.sample_format {
                SampleFormat::Float => WavFormat::IeeeFloat,
                SampleFormat::Int => WavFormat::Pcm,
            },
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: match spec.format {
                WavFormat::IeeeFloat => SampleFormat::Float,
                WavFormat::Pcm => SampleFormat::Int,
            },
        }
    }
}

/// Read a WAV file into a multi-channel buffer along with its spec.
///
/// Integer samples are scaled to `[-1, 1)` by `2^(bits - 1)`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(AudioBuffer, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());

    let interleaved: Vec<f64> = match spec.format {
        WavFormat::IeeeFloat => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        WavFormat::Pcm => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let buffer = AudioBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate);
    Ok((buffer, spec))
}

/// Write a buffer to a WAV file.
///
/// The channel count and sample rate come from the buffer; `spec` supplies
/// the sample format. Integer output is clipped to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &AudioBuffer, spec: WavSpec) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    let interleaved = buffer.to_interleaved();

    match spec.format {
        WavFormat::IeeeFloat => {
            for &sample in &interleaved {
                writer.write_sample(sample as f32)?;
            }
        }
        WavFormat::Pcm => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            let mut clipped = 0usize;
            for &sample in &interleaved {
                let scaled = (sample * max_val).round();
                if scaled > max_val - 1.0 || scaled < -max_val {
                    clipped += 1;
                }
                writer.write_sample(scaled.clamp(-max_val, max_val - 1.0) as i32)?;
            }
            if clipped > 0 {
                tracing::warn!(clipped, "samples clipped while writing PCM");
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn stereo_ramp() -> AudioBuffer {
        AudioBuffer::new(
            vec![
                (0..1000).map(|i| (i as f64 / 1000.0).sin() * 0.9).collect(),
                (0..1000).map(|i| (i as f64 / 1000.0).cos() * 0.5).collect(),
            ],
            44100,
        )
    }

    #[test]
    fn test_roundtrip_float32() {
        let buffer = stereo_ramp();
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, WavSpec::float32(2, 44100)).unwrap();

        let (loaded, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec, WavSpec::float32(2, 44100));
        assert_eq!(loaded.num_channels(), 2);
        assert_eq!(loaded.len(), 1000);
        for c in 0..2 {
            for (a, b) in buffer.channels[c].iter().zip(loaded.channels[c].iter()) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_roundtrip_pcm24() {
        let buffer = stereo_ramp();
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, WavSpec::pcm24(2, 44100)).unwrap();

        let (loaded, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(spec.format, WavFormat::Pcm);
        for c in 0..2 {
            for (a, b) in buffer.channels[c].iter().zip(loaded.channels[c].iter()) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_pcm_clips_overs() {
        let buffer = AudioBuffer::from_mono(vec![1.5, -1.5, 0.0], 48000);
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, WavSpec::pcm24(1, 48000)).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        assert!(loaded.channels[0][0] < 1.0 && loaded.channels[0][0] > 0.9999);
        assert_eq!(loaded.channels[0][1], -1.0);
        assert_eq!(loaded.channels[0][2], 0.0);
    }

    #[test]
    fn test_channel_count_follows_buffer() {
        let buffer = stereo_ramp();
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, WavSpec::float32(1, 8000)).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.num_frames, 1000);
        assert_eq!(info.format, WavFormat::IeeeFloat);
        assert!((info.duration_secs - 1000.0 / 44100.0).abs() < 1e-12);
    }
}
