//! Multi-channel audio buffer for file-level processing.
//!
//! [`AudioBuffer`] holds one `Vec<f64>` per channel (non-interleaved) plus the
//! sample rate. Spectral analysis works on the mono mixdown; convolution and
//! gain are applied per channel.

/// Non-interleaved multi-channel audio.
///
/// # Example
///
/// ```rust
/// use matcheq_core::AudioBuffer;
///
/// let buffer = AudioBuffer::new(vec![vec![1.0; 4], vec![0.5; 4]], 48000);
/// assert_eq!(buffer.len(), 4);
/// assert_eq!(buffer.to_mono()[0], 0.75);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Per-channel samples, all of equal length.
    pub channels: Vec<Vec<f64>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from per-channel sample vectors.
    pub fn new(channels: Vec<Vec<f64>>, sample_rate: u32) -> Self {
        debug_assert!(
            channels.windows(2).all(|w| w[0].len() == w[1].len()),
            "Channels must have same length"
        );
        Self {
            channels,
            sample_rate,
        }
    }

    /// Create a single-channel buffer.
    pub fn from_mono(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Create a buffer from interleaved frames (`c0, c1, .., c0, c1, ..`).
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(interleaved: &[f64], num_channels: usize, sample_rate: u32) -> Self {
        let num_channels = num_channels.max(1);
        let frames = interleaved.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self {
            channels,
            sample_rate,
        }
    }

    /// Interleave the channels into a single vector.
    pub fn to_interleaved(&self) -> Vec<f64> {
        let n = self.len();
        let mut out = Vec::with_capacity(n * self.num_channels());
        for i in 0..n {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Mix down to mono by averaging channels.
    pub fn to_mono(&self) -> Vec<f64> {
        match self.channels.as_slice() {
            [] => Vec::new(),
            [only] => only.clone(),
            channels => {
                let scale = 1.0 / channels.len() as f64;
                (0..self.len())
                    .map(|i| channels.iter().map(|c| c[i]).sum::<f64>() * scale)
                    .collect()
            }
        }
    }

    /// Multiply every sample by `gain`.
    pub fn scale(&mut self, gain: f64) {
        for channel in &mut self.channels {
            for sample in channel.iter_mut() {
                *sample *= gain;
            }
        }
    }

    /// Largest absolute sample across all channels.
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .map(|c| crate::math::peak_abs(c))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let buffer = AudioBuffer::from_mono(vec![0.1, 0.2, 0.3], 44100);
        assert_eq!(buffer.num_channels(), 1);
        assert_eq!(buffer.to_mono(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn mixdown_averages_channels() {
        let buffer = AudioBuffer::new(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]], 48000);
        assert_eq!(buffer.to_mono(), vec![3.0, 4.0]);
    }

    #[test]
    fn interleaved_roundtrip() {
        let buffer = AudioBuffer::from_interleaved(&[1.0, 2.0, 3.0, 4.0, 5.0], 2, 48000);
        assert_eq!(buffer.channels, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
        assert_eq!(buffer.to_interleaved(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn scale_and_peak() {
        let mut buffer = AudioBuffer::new(vec![vec![1.0, -2.0, 3.0], vec![0.5, 0.5, 0.5]], 8000);
        buffer.scale(0.5);
        assert_eq!(buffer.channels[0], vec![0.5, -1.0, 1.5]);
        assert_eq!(buffer.peak(), 1.5);
    }

    #[test]
    fn empty_buffer() {
        let buffer = AudioBuffer::new(Vec::new(), 48000);
        assert!(buffer.is_empty());
        assert!(buffer.to_mono().is_empty());
        assert_eq!(buffer.duration_secs(), 0.0);
    }
}
