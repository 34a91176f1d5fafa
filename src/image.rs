use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder};

use crate::config::{Compression, RenderConfig};
use crate::error::EncodeError;
use crate::mandel_image::FrameStats;

/// Colored RGB pixels of one render, row-major, three bytes per pixel.
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stats: FrameStats,
}

impl PixelBuffer {
    pub fn new(data: Vec<u8>, width: u32, height: u32, stats: FrameStats) -> PixelBuffer {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * RenderConfig::CHANNELS
        );
        PixelBuffer {
            data,
            width,
            height,
            stats,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn encode(&self, encoder: &dyn Encoder) -> Result<Vec<u8>, EncodeError> {
        encoder.encode(
            &self.data,
            self.width,
            self.height,
            RenderConfig::CHANNELS as u8,
        )
    }
}

pub trait Encoder {
    /// Turn raw interleaved pixels into a file image.
    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Vec<u8>, EncodeError>;
}

pub struct Png {
    compression: Compression,
}

impl Png {
    pub fn new(compression: Compression) -> Png {
        Png { compression }
    }
}

impl Default for Png {
    fn default() -> Self {
        Png::new(Compression::Default)
    }
}

impl Encoder for Png {
    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Vec<u8>, EncodeError> {
        let color_type = match channels {
            1 => ColorType::L8,
            3 => ColorType::Rgb8,
            4 => ColorType::Rgba8,
            other => return Err(EncodeError::Channels(other)),
        };
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(channels as usize);
        if pixels.len() != expected {
            return Err(EncodeError::Dimensions {
                got: pixels.len(),
                expected,
                width,
                height,
                channels,
            });
        }
        let compression = match self.compression {
            Compression::Fast => CompressionType::Fast,
            Compression::Default => CompressionType::Default,
            Compression::Best => CompressionType::Best,
        };
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive)
            .write_image(pixels, width, height, color_type)?;
        Ok(out)
    }
}
