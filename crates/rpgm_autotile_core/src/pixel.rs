//! RGBA8 pixel storage
//!
//! Pixels are stored row-major with the origin at the **bottom-left** corner:
//! `y = 0` is the bottom row of the image. Decoded images from most codecs use a
//! top-left origin, so the `image` feature flips rows on the way in and out.

use crate::{PixelError, PixelRegion};

/// One RGBA8 pixel
pub type Rgba = [u8; 4];

/// Fully transparent black, the fill color of a fresh buffer
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// An owned RGBA8 image with a bottom-left origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Create a buffer by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap raw RGBA bytes laid out bottom row first
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> Result<Self, PixelError> {
        let expected = width as usize * height as usize * 4;
        if raw.len() != expected {
            return Err(PixelError::InvalidBufferLength {
                width,
                height,
                expected,
                actual: raw.len(),
            });
        }

        let pixels = raw
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The region covering the whole buffer
    pub fn bounds(&self) -> PixelRegion {
        PixelRegion::new(0, 0, self.width, self.height)
    }

    /// Whether `region` lies entirely inside this buffer
    pub fn contains(&self, region: &PixelRegion) -> bool {
        region.right() <= self.width as u64 && region.top() <= self.height as u64
    }

    /// Get the pixel at `(x, y)`, counting `y` from the bottom row
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.offset(x, y)).copied()
    }

    /// Set the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            let offset = self.offset(x, y);
            self.pixels[offset] = color;
        }
    }

    /// Flatten to raw RGBA bytes, bottom row first
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Check whether every pixel in `region` is fully transparent
    pub fn is_region_clear(&self, region: &PixelRegion) -> bool {
        region
            .positions()
            .all(|(x, y)| self.get(x, y).map_or(true, |px| px[3] == 0))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(feature = "image")]
impl From<&image::RgbaImage> for PixelBuffer {
    fn from(img: &image::RgbaImage) -> Self {
        let height = img.height();
        PixelBuffer::from_fn(img.width(), height, |x, y| {
            img.get_pixel(x, height - 1 - y).0
        })
    }
}

#[cfg(feature = "image")]
impl From<&PixelBuffer> for image::RgbaImage {
    fn from(buffer: &PixelBuffer) -> Self {
        let height = buffer.height();
        image::RgbaImage::from_fn(buffer.width(), height, |x, row| {
            image::Rgba(buffer.get(x, height - 1 - row).unwrap_or(crate::TRANSPARENT))
        })
    }
}
