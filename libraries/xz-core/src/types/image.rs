/// Image batches handed over by the host
use crate::error::{CoreError, Result};

/// Channel layouts a batch may carry: grey, RGB, RGBA
pub const IMAGE_CHANNELS: [usize; 3] = [1, 3, 4];

/// A batch of same-sized images as `[count, height, width, channels]` floats in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    pixels: Vec<f32>,
    width: u32,
    height: u32,
    channels: usize,
}

impl ImageBatch {
    pub fn new(pixels: Vec<f32>, width: u32, height: u32, channels: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImage(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if !IMAGE_CHANNELS.contains(&channels) {
            return Err(CoreError::InvalidImage(format!(
                "unsupported channel count {}",
                channels
            )));
        }

        let image_len = width as usize * height as usize * channels;
        if pixels.is_empty() || pixels.len() % image_len != 0 {
            return Err(CoreError::InvalidImage(format!(
                "{} values is not a whole number of {}x{}x{} images",
                pixels.len(),
                width,
                height,
                channels
            )));
        }

        Ok(Self {
            pixels,
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len() / self.image_len()
    }

    /// Never true for a constructed batch
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Image `index` quantized to 8 bits, values outside `0..=1` saturate
    pub fn to_rgb8(&self, index: usize) -> Option<Vec<u8>> {
        let len = self.image_len();
        let start = index.checked_mul(len)?;
        let image = self.pixels.get(start..start + len)?;
        Some(
            image
                .iter()
                .map(|v| (v * 255.0).clamp(0.0, 255.0) as u8)
                .collect(),
        )
    }

    fn image_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels
    }
}
