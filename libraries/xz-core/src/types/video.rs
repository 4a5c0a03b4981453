/// Raw video frames handed over by the host
use crate::error::{CoreError, Result};
use crate::types::AudioBuffer;
use bytes::Bytes;

/// Packed RGB24 frames plus an optional soundtrack
#[derive(Debug, Clone)]
pub struct VideoFrames {
    data: Bytes,
    width: u32,
    height: u32,
    frame_rate: f64,
    audio: Option<AudioBuffer>,
}

impl VideoFrames {
    /// Wrap packed RGB24 frame data
    ///
    /// `data` must hold a whole number of `width * height * 3` byte frames.
    pub fn new(data: impl Into<Bytes>, width: u32, height: u32, frame_rate: f64) -> Result<Self> {
        let data = data.into();
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidVideo(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(CoreError::InvalidVideo(format!(
                "frame rate must be positive, got {}",
                frame_rate
            )));
        }

        let frame_size = width as usize * height as usize * 3;
        if data.is_empty() || data.len() % frame_size != 0 {
            return Err(CoreError::InvalidVideo(format!(
                "{} bytes is not a whole number of {}x{} RGB24 frames",
                data.len(),
                width,
                height
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            frame_rate,
            audio: None,
        })
    }

    /// Attach a soundtrack
    #[must_use]
    pub fn with_audio(mut self, audio: AudioBuffer) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn audio(&self) -> Option<&AudioBuffer> {
        self.audio.as_ref()
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / (self.width as usize * self.height as usize * 3)
    }
}
