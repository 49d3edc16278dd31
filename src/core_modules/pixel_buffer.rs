use crate::error::BufferError;
use image::RgbaImage;

const CHANNELS: usize = 4;

/// A read-only view over a flat RGBA sample array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    samples: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wraps `samples`, which must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, samples: &'a [u8]) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * CHANNELS;
        if samples.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The red, green and blue samples at `(x, y)`. Alpha is ignored.
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let index = (y as usize * self.width as usize + x as usize) * CHANNELS;
        (
            self.samples[index],
            self.samples[index + 1],
            self.samples[index + 2],
        )
    }
}

impl<'a> From<&'a RgbaImage> for PixelBuffer<'a> {
    fn from(image: &'a RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            samples: image.as_raw(),
        }
    }
}
