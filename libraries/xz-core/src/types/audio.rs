/// Audio sample buffer passed between nodes
use crate::error::{CoreError, Result};

/// Highest channel count accepted (7.1)
pub const MAX_CHANNELS: usize = 8;

/// Multi-channel audio in f32
///
/// Samples are interleaved: [L, R, L, R, ...] for stereo. A buffer is
/// immutable once built; processing stages produce a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    pub fn from_interleaved(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        validate_layout(channels, sample_rate)?;
        if samples.len() % channels != 0 {
            return Err(CoreError::RaggedSamples {
                samples: samples.len(),
                channels,
            });
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a buffer from one slice per channel (the host's `(channels, samples)` matrix)
    pub fn from_planar<C: AsRef<[f32]>>(channels: &[C], sample_rate: u32) -> Result<Self> {
        validate_layout(channels.len(), sample_rate)?;

        let frames = channels[0].as_ref().len();
        for (index, channel) in channels.iter().enumerate() {
            let len = channel.as_ref().len();
            if len != frames {
                return Err(CoreError::ChannelLengthMismatch {
                    channel: index,
                    len,
                    expected: frames,
                });
            }
        }

        let mut samples = Vec::with_capacity(frames * channels.len());
        for frame in 0..frames {
            for channel in channels {
                samples.push(channel.as_ref()[frame]);
            }
        }

        Ok(Self {
            samples,
            channels: channels.len(),
            sample_rate,
        })
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy out a single channel
    pub fn channel(&self, index: usize) -> Option<Vec<f32>> {
        if index >= self.channels {
            return None;
        }
        Some(
            self.samples
                .iter()
                .skip(index)
                .step_by(self.channels)
                .copied()
                .collect(),
        )
    }

    /// Split into one vector per channel
    pub fn to_planar(&self) -> Vec<Vec<f32>> {
        (0..self.channels)
            .filter_map(|index| self.channel(index))
            .collect()
    }

    /// Consume the buffer, returning interleaved samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

fn validate_layout(channels: usize, sample_rate: u32) -> Result<()> {
    if !(1..=MAX_CHANNELS).contains(&channels) {
        return Err(CoreError::InvalidChannelCount(channels));
    }
    if sample_rate == 0 {
        return Err(CoreError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}
