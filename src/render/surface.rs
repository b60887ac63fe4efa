//! Display targets for finished frames.
//!
//! The framebuffer hands a sub-rectangle of its color buffer to a [`Surface`].
//! [`ImageSurface`] keeps the result in memory (and can write a PNG), the SDL
//! window implements the same trait behind the `window` feature.

use std::path::Path;

use image::{ImageResult, Rgba, RgbaImage};

use crate::colors;

/// Axis-aligned pixel rectangle with inclusive origin and exclusive extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        PixelRect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Something that can show pixels.
pub trait Surface {
    /// Copy `rect` into the surface at the same position.
    ///
    /// `pixels` starts at the rectangle's top-left pixel; consecutive rows
    /// are `stride` colors apart.
    fn blit(&mut self, rect: PixelRect, pixels: &[u32], stride: usize);
}

/// In-memory RGBA image target.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
    blits: usize,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
            blits: 0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel as packed ARGB, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        let Rgba([r, g, b, a]) = *self.image.get_pixel_checked(x, y)?;
        Some(colors::rgba(r, g, b, a))
    }

    /// Number of blits received so far.
    pub fn blit_count(&self) -> usize {
        self.blits
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }
}

impl Surface for ImageSurface {
    fn blit(&mut self, rect: PixelRect, pixels: &[u32], stride: usize) {
        self.blits += 1;
        for row in 0..rect.height {
            let start = row as usize * stride;
            let Some(line) = pixels.get(start..start + rect.width as usize) else {
                break;
            };
            for (col, &color) in line.iter().enumerate() {
                let (x, y) = (rect.x + col as u32, rect.y + row);
                if x < self.image.width() && y < self.image.height() {
                    self.image.put_pixel(x, y, Rgba(colors::channels(color)));
                }
            }
        }
    }
}
